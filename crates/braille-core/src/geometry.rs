use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned region in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRegion {
    pub min: Point2<f32>,
    pub max: Point2<f32>,
}

impl CellRegion {
    pub fn new(min: Point2<f32>, max: Point2<f32>) -> Self {
        Self { min, max }
    }

    /// Bounding box of a set of points, or `None` when the set is empty.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2<f32>>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        });
        Some(Self { min, max })
    }

    /// Grow the region by `dx` horizontally and `dy` vertically on each side.
    pub fn padded(self, dx: f32, dy: f32) -> Self {
        Self {
            min: Point2::new(self.min.x - dx, self.min.y - dy),
            max: Point2::new(self.max.x + dx, self.max.y + dy),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(0.5 * (self.min.x + self.max.x), 0.5 * (self.min.y + self.max.y))
    }

    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when the two regions share a positive-area intersection.
    /// Regions that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &CellRegion) -> bool {
        let w = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let h = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        w > 0.0 && h > 0.0
    }
}
