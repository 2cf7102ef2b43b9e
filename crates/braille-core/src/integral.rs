//! Summed-area tables for constant-time box statistics.

use crate::GrayImageView;

/// Integral image of intensities and squared intensities.
///
/// Tables have one extra row and column of zeros, so entry `(x, y)` holds
/// the sum over the half-open rectangle `[0, x) × [0, y)`.
#[derive(Clone, Debug)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    pub fn new(img: &GrayImageView<'_>) -> Self {
        let stride = img.width + 1;
        let mut sum = vec![0u64; stride * (img.height + 1)];
        let mut sum_sq = vec![0u64; stride * (img.height + 1)];

        for y in 0..img.height {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..img.width {
                let v = img.get(x, y) as u64;
                row += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row;
                sum_sq[idx] = sum_sq[idx - stride] + row_sq;
            }
        }

        Self {
            width: img.width,
            height: img.height,
            sum,
            sum_sq,
        }
    }

    /// Mean and variance over the square window of `radius` centred on
    /// `(x, y)`, clipped to the image.
    pub fn window_stats(&self, x: usize, y: usize, radius: usize) -> (f32, f32) {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(self.width);
        let y1 = (y + radius + 1).min(self.height);
        let n = ((x1 - x0) * (y1 - y0)) as f64;
        if n <= 0.0 {
            return (0.0, 0.0);
        }

        let s = self.rect(&self.sum, x0, y0, x1, y1) as f64;
        let s2 = self.rect(&self.sum_sq, x0, y0, x1, y1) as f64;
        let mean = s / n;
        let var = (s2 / n - mean * mean).max(0.0);
        (mean as f32, var as f32)
    }

    /// Mean over the clipped window of `radius` centred on `(x, y)`.
    #[inline]
    pub fn window_mean(&self, x: usize, y: usize, radius: usize) -> f32 {
        self.window_stats(x, y, radius).0
    }

    #[inline]
    fn rect(&self, table: &[u64], x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let stride = self.width + 1;
        table[y1 * stride + x1] + table[y0 * stride + x0]
            - table[y0 * stride + x1]
            - table[y1 * stride + x0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrayImage;
    use approx::assert_relative_eq;

    #[test]
    fn window_stats_match_brute_force() {
        let mut img = GrayImage::filled(7, 5, 0);
        for y in 0..5 {
            for x in 0..7 {
                img.set(x, y, ((x * 31 + y * 17) % 256) as u8);
            }
        }
        let integral = IntegralImage::new(&img.view());

        let (cx, cy, r) = (3usize, 2usize, 1usize);
        let mut values = Vec::new();
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                values.push(img.view().get(x, y) as f32);
            }
        }
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32;

        let (m, v) = integral.window_stats(cx, cy, r);
        assert_relative_eq!(m, mean, epsilon = 1e-3);
        assert_relative_eq!(v, var, epsilon = 1e-2);
    }

    #[test]
    fn window_is_clipped_at_borders() {
        let img = GrayImage::filled(4, 4, 200);
        let integral = IntegralImage::new(&img.view());
        let (m, v) = integral.window_stats(0, 0, 10);
        assert_relative_eq!(m, 200.0);
        assert_relative_eq!(v, 0.0);
    }
}
