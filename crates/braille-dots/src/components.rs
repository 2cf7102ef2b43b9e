//! 8-connected component labelling with moment statistics.

use nalgebra::Point2;

use crate::threshold::ForegroundMask;

/// Accumulated statistics of one connected component.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComponentStats {
    pub area: usize,
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl ComponentStats {
    fn seed(x: usize, y: usize) -> Self {
        Self {
            area: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            ..Self::default()
        }
    }

    fn add(&mut self, x: usize, y: usize) {
        let (fx, fy) = (x as f64, y as f64);
        self.area += 1;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.sum_x += fx;
        self.sum_y += fy;
        self.sum_xx += fx * fx;
        self.sum_yy += fy * fy;
        self.sum_xy += fx * fy;
    }

    pub fn centroid(&self) -> Point2<f32> {
        let n = self.area.max(1) as f64;
        Point2::new((self.sum_x / n) as f32, (self.sum_y / n) as f32)
    }

    pub fn bbox_width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn bbox_height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// Long side over short side of the bounding box.
    pub fn aspect_ratio(&self) -> f32 {
        let w = self.bbox_width() as f32;
        let h = self.bbox_height() as f32;
        w.max(h) / w.min(h)
    }

    /// Eigenvalues `(λmax, λmin)` of the pixel covariance matrix.
    ///
    /// Each pixel is treated as a unit square, hence the `1/12` terms.
    pub fn principal_variances(&self) -> (f32, f32) {
        let n = self.area.max(1) as f64;
        let mx = self.sum_x / n;
        let my = self.sum_y / n;
        let cxx = self.sum_xx / n - mx * mx + 1.0 / 12.0;
        let cyy = self.sum_yy / n - my * my + 1.0 / 12.0;
        let cxy = self.sum_xy / n - mx * my;

        let half_trace = 0.5 * (cxx + cyy);
        let det = cxx * cyy - cxy * cxy;
        let disc = (half_trace * half_trace - det).max(0.0).sqrt();
        ((half_trace + disc) as f32, (half_trace - disc).max(0.0) as f32)
    }

    /// `sqrt(λmin / λmax)`: 1 for isotropic blobs, towards 0 for lines.
    pub fn roundness(&self) -> f32 {
        let (l1, l2) = self.principal_variances();
        if l1 <= f32::EPSILON {
            return 1.0;
        }
        (l2 / l1).sqrt()
    }

    /// Area relative to the moment-equivalent ellipse, folded into `(0, 1]`.
    pub fn fill_score(&self) -> f32 {
        let (l1, l2) = self.principal_variances();
        let ellipse = 4.0 * std::f32::consts::PI * (l1 * l2).sqrt();
        if ellipse <= f32::EPSILON {
            return 0.0;
        }
        let fill = self.area as f32 / ellipse;
        fill.min(1.0 / fill)
    }
}

/// Label 8-connected foreground regions.
///
/// Components are returned in raster order of their first pixel.
pub fn label_components(mask: &ForegroundMask) -> Vec<ComponentStats> {
    let (w, h) = (mask.width, mask.height);
    let mut visited = vec![false; w * h];
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for start in 0..w * h {
        if visited[start] || !mask.data[start] {
            continue;
        }

        let mut stats = ComponentStats::seed(start % w, start / w);
        visited[start] = true;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            stats.add(x, y);

            let x0 = x.saturating_sub(1);
            let y0 = y.saturating_sub(1);
            let x1 = (x + 1).min(w - 1);
            let y1 = (y + 1).min(h - 1);
            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    let n = ny * w + nx;
                    if !visited[n] && mask.data[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }

        components.push(stats);
    }

    components
}
