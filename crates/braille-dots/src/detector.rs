use braille_core::{DotObservation, GrayImageView};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::{label_components, ComponentStats};
use crate::params::{DotDetectorParams, DotSizeRange};
use crate::threshold::adaptive_threshold;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Why components were discarded during filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub too_small: usize,
    pub too_large: usize,
    pub elongated: usize,
}

/// Detected dots plus filtering diagnostics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DotDetection {
    pub dots: Vec<DotObservation>,
    pub size_range: DotSizeRange,
    pub components: usize,
    pub rejected: RejectionCounts,
}

/// Finds raised-dot impressions in a normalized buffer.
pub struct DotDetector {
    params: DotDetectorParams,
}

impl DotDetector {
    pub fn new(params: DotDetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DotDetectorParams {
        &self.params
    }

    /// Dots sorted top-to-bottom, then left-to-right. An empty result means
    /// an empty page, not a failure.
    pub fn detect(&self, img: &GrayImageView<'_>) -> Vec<DotObservation> {
        self.detect_with_diagnostics(img).dots
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width, height = img.height))
    )]
    pub fn detect_with_diagnostics(&self, img: &GrayImageView<'_>) -> DotDetection {
        let size_range = self.params.size_range(img.width, img.height);
        let window = self.params.window_radius(&size_range);
        let mask = adaptive_threshold(img, window, &self.params.threshold);
        let components = label_components(&mask);

        let mut rejected = RejectionCounts::default();
        let mut dots: Vec<DotObservation> = components
            .iter()
            .filter_map(|c| self.accept(c, &size_range, &mut rejected))
            .collect();
        dots.sort_by(|a, b| {
            a.center
                .y
                .total_cmp(&b.center.y)
                .then(a.center.x.total_cmp(&b.center.x))
        });

        debug!(
            "{} components -> {} dots (small {}, large {}, elongated {}), window {window}",
            components.len(),
            dots.len(),
            rejected.too_small,
            rejected.too_large,
            rejected.elongated
        );

        DotDetection {
            dots,
            size_range,
            components: components.len(),
            rejected,
        }
    }

    fn accept(
        &self,
        c: &ComponentStats,
        range: &DotSizeRange,
        rejected: &mut RejectionCounts,
    ) -> Option<DotObservation> {
        let area = c.area as f32;
        if area < range.min_area() {
            rejected.too_small += 1;
            return None;
        }
        if area > range.max_area() {
            rejected.too_large += 1;
            return None;
        }

        let roundness = c.roundness();
        if c.aspect_ratio() > self.params.max_aspect_ratio || roundness < self.params.min_roundness
        {
            rejected.elongated += 1;
            return None;
        }

        Some(DotObservation {
            center: c.centroid(),
            radius: (area / std::f32::consts::PI).sqrt(),
            confidence: (roundness * c.fill_score()).clamp(0.0, 1.0),
            area: c.area,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use braille_core::GrayImage;

    fn paint_disk(img: &mut GrayImage, cx: i32, cy: i32, r: i32) {
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r * r {
                    img.set(x as usize, y as usize, 0);
                }
            }
        }
    }

    fn paint_rect(img: &mut GrayImage, x0: usize, y0: usize, w: usize, h: usize) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.set(x, y, 0);
            }
        }
    }

    #[test]
    fn finds_disks_with_subpixel_centroids() {
        let mut img = GrayImage::filled(80, 60, 255);
        paint_disk(&mut img, 20, 20, 3);
        paint_disk(&mut img, 50, 35, 3);

        let dots = DotDetector::new(DotDetectorParams::default()).detect(&img.view());
        assert_eq!(dots.len(), 2);
        assert_relative_eq!(dots[0].center.x, 20.0, epsilon = 1e-4);
        assert_relative_eq!(dots[0].center.y, 20.0, epsilon = 1e-4);
        assert_relative_eq!(dots[1].center.x, 50.0, epsilon = 1e-4);
        assert!(dots[0].confidence > 0.8, "confidence {}", dots[0].confidence);
        assert!((dots[0].radius - 3.0).abs() < 0.5);
    }

    #[test]
    fn rejects_noise_scratches_and_blobs() {
        let mut img = GrayImage::filled(120, 120, 255);
        paint_disk(&mut img, 30, 30, 3); // dot
        img.set(80, 20, 0); // speck
        paint_rect(&mut img, 10, 80, 30, 2); // scratch
        paint_rect(&mut img, 70, 70, 30, 30); // shadow blob

        let detection =
            DotDetector::new(DotDetectorParams::default()).detect_with_diagnostics(&img.view());
        assert_eq!(detection.dots.len(), 1);
        assert_relative_eq!(detection.dots[0].center.x, 30.0, epsilon = 1e-4);
        assert_eq!(detection.rejected.too_small, 1);
        assert_eq!(detection.rejected.elongated, 1);
        assert!(detection.rejected.too_large >= 1);
    }

    #[test]
    fn empty_page_yields_no_dots() {
        let img = GrayImage::filled(50, 50, 255);
        assert!(DotDetector::new(DotDetectorParams::default())
            .detect(&img.view())
            .is_empty());
    }
}
