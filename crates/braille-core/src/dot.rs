use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A raised-dot impression found in the normalized image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotObservation {
    /// Sub-pixel centroid in image coordinates.
    pub center: Point2<f32>,
    /// Radius of the disk with the same area as the component.
    pub radius: f32,
    /// Shape confidence in `[0, 1]`; 1 is a perfectly filled disk.
    pub confidence: f32,
    /// Pixel count of the component.
    pub area: usize,
}

impl DotObservation {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Point2::new(x, y),
            radius,
            confidence: 1.0,
            area: (std::f32::consts::PI * radius * radius).round() as usize,
        }
    }
}
