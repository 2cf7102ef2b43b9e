//! Drawing recognized cells onto the source image.

use braille_core::{Cell, CellRegion, DotObservation};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

/// Colours and sizes used by [`Annotator`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    pub glyph_outline: [u8; 3],
    pub blank_outline: [u8; 3],
    pub dot_fill: [u8; 3],
    /// Marker radius in pixels; `None` uses the detected dot radius.
    pub dot_radius: Option<u32>,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            glyph_outline: [220, 30, 30],
            blank_outline: [30, 90, 220],
            dot_fill: [20, 170, 60],
            dot_radius: None,
        }
    }
}

/// Paints cell outlines and slot markers onto an RGB canvas.
pub struct Annotator<'a> {
    canvas: &'a mut RgbImage,
    style: AnnotationStyle,
}

impl<'a> Annotator<'a> {
    pub fn new(canvas: &'a mut RgbImage, style: AnnotationStyle) -> Self {
        Self { canvas, style }
    }

    /// Outline the cell region and fill a marker on every active slot.
    ///
    /// `dots` is the observation arena the cell's slot indices refer to.
    pub fn mark(&mut self, cell: &Cell, dots: &[DotObservation]) {
        let outline = if cell.is_blank() {
            self.style.blank_outline
        } else {
            self.style.glyph_outline
        };
        if let Some(rect) = pixel_rect(&cell.region) {
            draw_hollow_rect_mut(&mut *self.canvas, rect, Rgb(outline));
        }

        for dot in cell.slots.iter().flatten().filter_map(|&i| dots.get(i)) {
            let r = self
                .style
                .dot_radius
                .map_or(dot.radius.round() as i32, |r| r as i32)
                .max(1);
            let center = (dot.center.x.round() as i32, dot.center.y.round() as i32);
            draw_filled_circle_mut(&mut *self.canvas, center, r, Rgb(self.style.dot_fill));
        }
    }
}

/// Integer rectangle covering the pixels whose centres fall inside `region`.
fn pixel_rect(region: &CellRegion) -> Option<Rect> {
    let x0 = region.min.x.ceil() as i32;
    let y0 = region.min.y.ceil() as i32;
    let x1 = region.max.x.floor() as i32;
    let y1 = region.max.y.floor() as i32;
    if x1 < x0 || y1 < y0 {
        return None;
    }
    Some(Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32))
}
