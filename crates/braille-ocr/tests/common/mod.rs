//! Synthetic embossed pages for end-to-end tests.
#![allow(dead_code)]

use braille_ocr::decode::Symbol;
use braille_ocr::{BrailleTable, DotMask};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;

/// Page geometry in pixels. Defaults match a small, clean scan.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub margin: u32,
    pub dot_pitch: u32,
    pub cell_pitch: u32,
    pub line_pitch: u32,
    pub dot_radius: i32,
    pub paper: u8,
    pub ink: u8,
    /// Extra brightness added across the width (uneven lighting).
    pub gradient: u8,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            margin: 30,
            dot_pitch: 10,
            cell_pitch: 25,
            line_pitch: 50,
            dot_radius: 3,
            paper: 235,
            ink: 60,
            gradient: 0,
        }
    }
}

/// Mask of a character under the international table, or the empty cell.
pub fn mask_of(c: char) -> DotMask {
    if c == ' ' {
        return DotMask::EMPTY;
    }
    (1..64u8)
        .filter_map(DotMask::new)
        .find(|&m| BrailleTable::International.lookup(m) == Some(Symbol::Char(c)))
        .unwrap_or_else(|| panic!("no pattern for {c:?}"))
}

/// One line of masks per text line.
pub fn encode(text: &str) -> Vec<Vec<DotMask>> {
    text.lines().map(|l| l.chars().map(mask_of).collect()).collect()
}

impl Page {
    /// Centre of dot slot `(col, row)` of cell `cell` on line `line`.
    pub fn dot_center(&self, line: usize, cell: usize, col: usize, row: usize) -> (u32, u32) {
        (
            self.margin + cell as u32 * self.cell_pitch + col as u32 * self.dot_pitch,
            self.margin + line as u32 * self.line_pitch + row as u32 * self.dot_pitch,
        )
    }

    pub fn render(&self, lines: &[Vec<DotMask>]) -> GrayImage {
        let cells = lines.iter().map(Vec::len).max().unwrap_or(0).max(1) as u32;
        let width = 2 * self.margin + cells * self.cell_pitch;
        let height = 2 * self.margin + lines.len().max(1) as u32 * self.line_pitch;

        let mut img = GrayImage::from_fn(width, height, |x, _| {
            Luma([self.paper.saturating_add((x * self.gradient as u32 / width) as u8)])
        });
        for (li, line) in lines.iter().enumerate() {
            for (ci, mask) in line.iter().enumerate() {
                for p in mask.positions() {
                    let (col, row) = (((p - 1) / 3) as usize, ((p - 1) % 3) as usize);
                    let (x, y) = self.dot_center(li, ci, col, row);
                    let shade = img.get_pixel(x, y).0[0].saturating_sub(self.paper - self.ink);
                    draw_filled_circle_mut(
                        &mut img,
                        (x as i32, y as i32),
                        self.dot_radius,
                        Luma([shade]),
                    );
                }
            }
        }
        img
    }

    pub fn render_text(&self, text: &str) -> GrayImage {
        self.render(&encode(text))
    }
}

/// Darken single pixels and a thin horizontal scratch.
pub fn add_noise(img: &mut GrayImage, specks: &[(u32, u32)], scratch: (u32, u32, u32)) {
    for &(x, y) in specks {
        img.put_pixel(x, y, Luma([40]));
    }
    let (x0, y, len) = scratch;
    for x in x0..x0 + len {
        img.put_pixel(x, y, Luma([40]));
    }
}
