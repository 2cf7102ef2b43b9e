//! Raised-dot detection for embossed Braille images.
//!
//! Two stages live here:
//! 1. [`normalize`] flattens uneven lighting and stretches contrast so that
//!    dot impressions end up dark on a white background.
//! 2. [`DotDetector`] binarizes the normalized buffer with a local
//!    mean/variance threshold, labels connected components and keeps those
//!    whose size and shape are consistent with a Braille dot.
//!
//! ```
//! use braille_core::GrayImage;
//! use braille_dots::{normalize, DotDetector, DotDetectorParams, PreprocessParams};
//!
//! let img = GrayImage::filled(64, 64, 230);
//! let normalized = normalize(&img.view(), &PreprocessParams::default());
//! let dots = DotDetector::new(DotDetectorParams::default()).detect(&normalized.view());
//! assert!(dots.is_empty());
//! ```

mod components;
mod detector;
mod params;
mod preprocess;
mod threshold;

pub use components::{label_components, ComponentStats};
pub use detector::{DotDetection, DotDetector, RejectionCounts};
pub use params::{DotDetectorParams, DotPolarity, DotSizeRange, PreprocessParams, ThresholdParams};
pub use preprocess::normalize;
pub use threshold::{adaptive_threshold, ForegroundMask};
