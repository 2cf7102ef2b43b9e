//! Local adaptive binarization.

use braille_core::{GrayImageView, IntegralImage};

use crate::params::ThresholdParams;

/// Binary foreground mask, row-major; `true` marks dot pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForegroundMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl ForegroundMask {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Sauvola-style threshold over a square window of `window_radius`.
///
/// A pixel is foreground when it is darker than
/// `mean * (1 + k * (std / dynamic_range - 1))` and at least
/// `min_contrast` below the local mean. The second condition keeps flat
/// paper regions free of speckle.
pub fn adaptive_threshold(
    img: &GrayImageView<'_>,
    window_radius: usize,
    params: &ThresholdParams,
) -> ForegroundMask {
    let mut mask = ForegroundMask {
        width: img.width,
        height: img.height,
        data: vec![false; img.width * img.height],
    };
    if img.is_empty() {
        return mask;
    }

    let integral = IntegralImage::new(img);
    let range = params.dynamic_range.max(1.0);
    for y in 0..img.height {
        for x in 0..img.width {
            let (mean, var) = integral.window_stats(x, y, window_radius);
            let std = var.sqrt();
            let t = mean * (1.0 + params.k * (std / range - 1.0));
            let p = img.get(x, y) as f32;
            if p < t && mean - p >= params.min_contrast {
                mask.data[y * img.width + x] = true;
            }
        }
    }
    mask
}
