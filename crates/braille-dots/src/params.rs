use serde::{Deserialize, Serialize};

const MM_PER_INCH: f32 = 25.4;

/// Whether dot impressions appear darker or brighter than the paper.
///
/// Side-lit embossing usually casts a shadow that makes dots darker;
/// flatbed scans of the back side often show them brighter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotPolarity {
    #[default]
    Dark,
    Bright,
}

/// Illumination correction settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    pub polarity: DotPolarity,
    /// Radius of the box filter used as background estimate.
    /// `None` picks `max(8, min(w, h) / 8)`.
    pub background_radius: Option<usize>,
    /// Gain applied to the background-subtracted signal.
    pub gain: f32,
    /// Minimal intensity range for the final contrast stretch; flatter
    /// buffers are left unstretched so sensor noise is not amplified.
    pub min_dynamic_range: u8,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            polarity: DotPolarity::Dark,
            background_radius: None,
            gain: 1.0,
            min_dynamic_range: 32,
        }
    }
}

impl PreprocessParams {
    pub fn background_radius_for(&self, width: usize, height: usize) -> usize {
        self.background_radius
            .unwrap_or_else(|| (width.min(height) / 8).max(8))
            .max(1)
    }
}

/// Local mean/variance (Sauvola) threshold settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Window radius; `None` derives it from the expected dot size.
    pub window_radius: Option<usize>,
    /// Sensitivity to local standard deviation.
    pub k: f32,
    /// Dynamic range of the standard deviation (128 for 8-bit data).
    pub dynamic_range: f32,
    /// A foreground pixel must be at least this much darker than the local mean.
    pub min_contrast: f32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            window_radius: None,
            k: 0.2,
            dynamic_range: 128.0,
            min_contrast: 20.0,
        }
    }
}

/// Accepted dot diameter range in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotSizeRange {
    pub min_diameter: f32,
    pub max_diameter: f32,
}

impl DotSizeRange {
    pub fn min_area(&self) -> f32 {
        disk_area(self.min_diameter)
    }

    pub fn max_area(&self) -> f32 {
        disk_area(self.max_diameter)
    }

    pub fn contains_area(&self, area: usize) -> bool {
        let a = area as f32;
        a >= self.min_area() && a <= self.max_area()
    }
}

fn disk_area(diameter: f32) -> f32 {
    let r = 0.5 * diameter;
    std::f32::consts::PI * r * r
}

/// Parameters of the dot detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DotDetectorParams {
    pub threshold: ThresholdParams,
    /// Scan resolution. When known, the dot size range is derived from the
    /// physical dot diameter; otherwise from the image size.
    pub resolution_dpi: Option<f32>,
    /// Physical dot diameter range in millimetres `[min, max]`.
    pub dot_diameter_mm: [f32; 2],
    /// Smallest accepted diameter in pixels (noise floor).
    pub min_diameter_px: f32,
    /// Largest accepted diameter as a fraction of `min(w, h)` when no
    /// resolution is known.
    pub max_diameter_fraction: f32,
    /// Lower bound for the largest accepted diameter in pixels.
    pub max_diameter_floor_px: f32,
    /// Maximal bounding-box aspect ratio (long side / short side).
    pub max_aspect_ratio: f32,
    /// Minimal `sqrt(λmin / λmax)` of the component's second moments.
    pub min_roundness: f32,
}

impl Default for DotDetectorParams {
    fn default() -> Self {
        Self {
            threshold: ThresholdParams::default(),
            resolution_dpi: None,
            dot_diameter_mm: [0.8, 2.2],
            min_diameter_px: 3.0,
            max_diameter_fraction: 0.08,
            max_diameter_floor_px: 12.0,
            max_aspect_ratio: 2.0,
            min_roundness: 0.6,
        }
    }
}

impl DotDetectorParams {
    /// Expected dot size range for an image of the given dimensions.
    pub fn size_range(&self, width: usize, height: usize) -> DotSizeRange {
        match self.resolution_dpi.filter(|dpi| dpi.is_finite() && *dpi > 0.0) {
            Some(dpi) => {
                let px_per_mm = dpi / MM_PER_INCH;
                DotSizeRange {
                    min_diameter: (self.dot_diameter_mm[0] * px_per_mm).max(self.min_diameter_px),
                    max_diameter: (self.dot_diameter_mm[1] * px_per_mm)
                        .max(self.min_diameter_px + 1.0),
                }
            }
            None => {
                let by_size = width.min(height) as f32 * self.max_diameter_fraction;
                DotSizeRange {
                    min_diameter: self.min_diameter_px,
                    max_diameter: by_size.max(self.max_diameter_floor_px),
                }
            }
        }
    }

    /// Threshold window radius for the given size range.
    pub fn window_radius(&self, range: &DotSizeRange) -> usize {
        self.threshold
            .window_radius
            .unwrap_or_else(|| (1.5 * range.max_diameter).round().max(7.0) as usize)
            .max(1)
    }
}
