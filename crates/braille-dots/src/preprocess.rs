//! Illumination correction and contrast normalization.

use braille_core::{GrayImage, GrayImageView, IntegralImage};
use log::debug;

use crate::params::{DotPolarity, PreprocessParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Produce a working buffer with dark dots on a flat white background.
///
/// A large box mean serves as background estimate; the signed difference to
/// it is re-centred at white, so paper maps to 255 and impressions of the
/// configured polarity map darker. The result is then stretched to the full
/// 8-bit range unless it is nearly flat.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn normalize(img: &GrayImageView<'_>, params: &PreprocessParams) -> GrayImage {
    if img.is_empty() {
        return GrayImage {
            width: img.width,
            height: img.height,
            data: Vec::new(),
        };
    }

    let radius = params.background_radius_for(img.width, img.height);
    let integral = IntegralImage::new(img);
    let mut out = GrayImage::filled(img.width, img.height, 255);

    for y in 0..img.height {
        for x in 0..img.width {
            let background = integral.window_mean(x, y, radius);
            let p = img.get(x, y) as f32;
            let signal = match params.polarity {
                DotPolarity::Dark => p - background,
                DotPolarity::Bright => background - p,
            };
            let v = 255.0 + params.gain * signal;
            out.set(x, y, v.round().clamp(0.0, 255.0) as u8);
        }
    }

    stretch_contrast(&mut out, params.min_dynamic_range);
    debug!(
        "normalized {}x{} image (background radius {radius})",
        img.width, img.height
    );
    out
}

fn stretch_contrast(img: &mut GrayImage, min_range: u8) {
    let Some((lo, hi)) = img.view().min_max() else {
        return;
    };
    if hi.saturating_sub(lo) < min_range.max(1) {
        return;
    }
    let scale = 255.0 / (hi - lo) as f32;
    for v in img.data.iter_mut() {
        *v = ((*v - lo) as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
}
