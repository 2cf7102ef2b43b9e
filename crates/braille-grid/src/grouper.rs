use braille_core::{Cell, CellKind, CellRegion, DotMask, DotObservation, SLOT_COUNT};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::bands::{resolve_band_tops, split_row_bands, RowBand};
use crate::columns::{
    assemble_cells, estimate_cell_pitch, lattice_phase, split_columns, BandColumns, CellSpan,
};
use crate::error::GridInferenceError;
use crate::params::{GridGeometry, GridParams};
use crate::pitch::estimate_dot_pitch;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Cells of one page in reading order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Inferred (or supplied) geometry; `None` for an empty page.
    pub geometry: Option<GridGeometry>,
    pub cells: Vec<Cell>,
    /// Number of text lines that produced cells.
    pub lines: usize,
    /// Dots discarded as noise during slot assignment.
    pub dropped_dots: usize,
}

impl GridLayout {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells of the given line, left to right.
    pub fn line(&self, line: usize) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |c| c.line == line)
    }
}

/// Groups dot observations into Braille cells.
///
/// The grouper infers the dot pitch, splits the page into text lines and
/// the lines into cells, assigns dots to the six slots and inserts blank
/// cells at word gaps.
pub struct CellGrouper {
    params: GridParams,
}

/// A glyph cell before numbering.
struct Draft {
    mask: DotMask,
    slots: [Option<usize>; SLOT_COUNT],
    region: CellRegion,
}

impl CellGrouper {
    pub fn new(params: GridParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, dots), fields(num_dots = dots.len()))
    )]
    pub fn group(&self, dots: &[DotObservation]) -> Result<GridLayout, GridInferenceError> {
        if dots.is_empty() {
            debug!("no dots, empty layout");
            return Ok(GridLayout::default());
        }

        let supplied = self.params.geometry;
        if let Some(g) = supplied {
            if !g.is_valid() {
                return Err(GridInferenceError::InvalidGeometry(format!("{g:?}")));
            }
        } else if dots.len() < self.params.min_dots {
            return Err(GridInferenceError::InsufficientDots {
                found: dots.len(),
                required: self.params.min_dots,
            });
        }

        let (px, py) = match supplied {
            Some(g) => (g.dot_pitch_x, g.dot_pitch_y),
            None => {
                let pitch = estimate_dot_pitch(dots, &self.params)?;
                (pitch.x, pitch.y)
            }
        };

        let row_tol = self.params.column_tolerance * py;
        let split = split_row_bands(dots, py, self.params.band_tolerance * py, row_tol);
        let mut bands = split.bands;
        let line_pitch =
            resolve_band_tops(&mut bands, py, supplied.and_then(|g| g.line_pitch), row_tol);

        let col_tol = self.params.column_tolerance * px;
        let columns: Vec<BandColumns> = bands
            .iter()
            .map(|b| split_columns(dots, &b.dots, px, col_tol))
            .collect();

        let cell_pitch = match supplied {
            Some(g) => g.cell_pitch_x,
            None => estimate_cell_pitch(&columns, px, self.params.cell_pitch_ratio, 0.1)
                .filter(|&cp| cp > 1.5 * px)
                .unwrap_or_else(|| {
                    debug!("no paired cells to measure cell pitch, using nominal ratio");
                    self.params.cell_pitch_ratio * px
                }),
        };
        let phase = supplied
            .and_then(|g| g.column_phase)
            .or_else(|| lattice_phase(&columns, cell_pitch));

        let geometry = GridGeometry {
            dot_pitch_x: px,
            dot_pitch_y: py,
            cell_pitch_x: cell_pitch,
            line_pitch,
            column_phase: phase,
        };
        debug!(
            "geometry: dot pitch {px:.2}x{py:.2}, cell pitch {cell_pitch:.2}, {} bands",
            bands.len()
        );

        let limits = band_limits(dots, &bands, &geometry);
        let mut layout = GridLayout {
            geometry: Some(geometry),
            dropped_dots: split.noise.len(),
            ..GridLayout::default()
        };

        for ((band, cols), (y_lo, y_hi)) in bands.iter().zip(&columns).zip(limits) {
            let spans = assemble_cells(cols, px, cell_pitch, phase);
            let drafts: Vec<(f32, Draft)> = spans
                .iter()
                .filter_map(|span| {
                    self.build_draft(dots, band, span, &geometry, &mut layout.dropped_dots)
                        .map(|d| (span.origin, d))
                })
                .collect();
            if drafts.is_empty() {
                continue;
            }
            self.emit_line(&mut layout, drafts, &geometry, band.top, (y_lo, y_hi));
        }

        if layout.dropped_dots > 0 {
            warn!(
                "{} of {} dots dropped as off-grid noise",
                layout.dropped_dots,
                dots.len()
            );
        }
        debug!("{} cells on {} lines", layout.cells.len(), layout.lines);
        Ok(layout)
    }

    /// Assign the span's dots to slots; `None` when no dot survives.
    fn build_draft(
        &self,
        dots: &[DotObservation],
        band: &RowBand,
        span: &CellSpan,
        g: &GridGeometry,
        dropped: &mut usize,
    ) -> Option<Draft> {
        let max_dist = self.params.slot_tolerance * g.dot_pitch_x.min(g.dot_pitch_y);
        let mut slots: [Option<usize>; SLOT_COUNT] = [None; SLOT_COUNT];

        for &idx in &span.dots {
            let p = dots[idx].center;
            let (slot, dist) = (0..SLOT_COUNT)
                .map(|s| {
                    let (col, row) = (s / 3, s % 3);
                    let expected = Point2::new(
                        span.origin + col as f32 * g.dot_pitch_x,
                        band.top + row as f32 * g.dot_pitch_y,
                    );
                    (s, nalgebra::distance(&p, &expected))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))?;

            if dist > max_dist {
                *dropped += 1;
                continue;
            }
            match slots[slot] {
                Some(prev) if dots[prev].confidence >= dots[idx].confidence => *dropped += 1,
                Some(_) => {
                    *dropped += 1;
                    slots[slot] = Some(idx);
                }
                None => slots[slot] = Some(idx),
            }
        }

        let mut mask = DotMask::EMPTY;
        for (s, _) in slots.iter().enumerate().filter(|(_, d)| d.is_some()) {
            mask |= DotMask::slot(s / 3, s % 3);
        }
        let region = CellRegion::bounding(slots.iter().flatten().map(|&i| dots[i].center))?
            .padded(0.5 * g.dot_pitch_x, 0.5 * g.dot_pitch_y);
        Some(Draft {
            mask,
            slots,
            region,
        })
    }

    /// Number the drafts of one line, clip their regions and insert blanks.
    fn emit_line(
        &self,
        layout: &mut GridLayout,
        drafts: Vec<(f32, Draft)>,
        g: &GridGeometry,
        top: f32,
        (y_lo, y_hi): (f32, f32),
    ) {
        let line = layout.lines;
        layout.lines += 1;
        let blank_top = (top - 0.5 * g.dot_pitch_y).max(y_lo);
        let blank_bottom = (top + g.cell_height() + 0.5 * g.dot_pitch_y).min(y_hi);

        let mut column = 0;
        let mut prev: Option<(f32, f32)> = None; // (origin, region max x)
        for (origin, mut draft) in drafts {
            let r = &mut draft.region;
            r.min.y = r.min.y.max(y_lo);
            r.max.y = r.max.y.min(y_hi);
            if let Some((_, prev_max_x)) = prev {
                r.min.x = r.min.x.max(prev_max_x);
                r.max.x = r.max.x.max(r.min.x);
            }

            if let Some((prev_origin, prev_max_x)) = prev {
                if origin - prev_origin > self.params.word_gap_factor * g.cell_pitch_x {
                    layout.cells.push(Cell {
                        index: layout.cells.len(),
                        line,
                        column,
                        kind: CellKind::Blank,
                        mask: DotMask::EMPTY,
                        region: CellRegion::new(
                            Point2::new(prev_max_x, blank_top),
                            Point2::new(r.min.x, blank_bottom),
                        ),
                        slots: [None; SLOT_COUNT],
                    });
                    column += 1;
                }
            }

            prev = Some((origin, r.max.x));
            layout.cells.push(Cell {
                index: layout.cells.len(),
                line,
                column,
                kind: CellKind::Glyph,
                mask: draft.mask,
                region: draft.region,
                slots: draft.slots,
            });
            column += 1;
        }
    }
}

/// Vertical extent each band's regions may occupy, split halfway between
/// the dot extremes of neighbouring bands.
fn band_limits(dots: &[DotObservation], bands: &[RowBand], g: &GridGeometry) -> Vec<(f32, f32)> {
    let extent = |b: &RowBand| {
        b.dots.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &i| {
            let y = dots[i].center.y;
            (lo.min(y), hi.max(y))
        })
    };
    let extents: Vec<(f32, f32)> = bands.iter().map(extent).collect();

    (0..bands.len())
        .map(|i| {
            let lo = if i == 0 {
                extents[i].0.min(bands[i].top) - g.dot_pitch_y
            } else {
                0.5 * (extents[i - 1].1 + extents[i].0)
            };
            let hi = if i + 1 == bands.len() {
                extents[i].1.max(bands[i].top + g.cell_height()) + g.dot_pitch_y
            } else {
                0.5 * (extents[i].1 + extents[i + 1].0)
            };
            (lo, hi)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Dots of a cell with row-1/left slot at (ox, oy) and pitch 10.
    fn cell_dots(ox: f32, oy: f32, positions: &[u8]) -> Vec<DotObservation> {
        positions
            .iter()
            .map(|&p| {
                let col = ((p - 1) / 3) as f32;
                let row = ((p - 1) % 3) as f32;
                DotObservation::new(ox + col * 10.0, oy + row * 10.0, 3.0)
            })
            .collect()
    }

    fn masks(layout: &GridLayout) -> Vec<u8> {
        layout.cells.iter().map(|c| c.mask.bits()).collect()
    }

    #[test]
    fn empty_input_gives_empty_layout() {
        let layout = CellGrouper::new(GridParams::default()).group(&[]).expect("layout");
        assert!(layout.is_empty());
        assert!(layout.geometry.is_none());
    }

    #[test]
    fn too_few_dots_is_an_error() {
        let dots = cell_dots(20.0, 20.0, &[1, 2, 4]);
        let err = CellGrouper::new(GridParams::default()).group(&dots).unwrap_err();
        assert_eq!(
            err,
            GridInferenceError::InsufficientDots {
                found: 3,
                required: 6
            }
        );
    }

    #[test]
    fn single_full_cell() {
        let dots = cell_dots(30.0, 30.0, &[1, 2, 3, 4, 5, 6]);
        let layout = CellGrouper::new(GridParams::default()).group(&dots).expect("layout");
        assert_eq!(masks(&layout), vec![63]);
        let cell = &layout.cells[0];
        assert_eq!((cell.line, cell.column, cell.index), (0, 0, 0));
        assert_eq!(cell.kind, CellKind::Glyph);
        assert_relative_eq!(cell.region.min.x, 25.0, epsilon = 1e-4);
        assert_relative_eq!(cell.region.max.y, 55.0, epsilon = 1e-4);
        let g = layout.geometry.expect("geometry");
        assert_relative_eq!(g.dot_pitch_x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(g.cell_pitch_x, 25.0, epsilon = 1e-4);
    }

    #[test]
    fn word_gap_inserts_one_blank() {
        let mut dots = cell_dots(20.0, 20.0, &[1]);
        dots.extend(cell_dots(95.0, 20.0, &[1]));
        let params = GridParams::with_geometry(GridGeometry::uniform(10.0, 25.0));
        let layout = CellGrouper::new(params).group(&dots).expect("layout");

        assert_eq!(masks(&layout), vec![1, 0, 1]);
        let blank = &layout.cells[1];
        assert!(blank.is_blank());
        assert_eq!(blank.column, 1);
        assert_relative_eq!(blank.region.min.x, layout.cells[0].region.max.x);
        assert_relative_eq!(blank.region.max.x, layout.cells[2].region.min.x);
    }

    #[test]
    fn adjacent_cells_have_no_blank() {
        // "b" then "c" at cell pitch 25.
        let mut dots = cell_dots(20.0, 20.0, &[1, 2]);
        dots.extend(cell_dots(45.0, 20.0, &[1, 4]));
        dots.extend(cell_dots(70.0, 20.0, &[1, 2, 3, 4, 5, 6]));
        let layout = CellGrouper::new(GridParams::default()).group(&dots).expect("layout");
        assert_eq!(masks(&layout), vec![0b11, 0b1001, 63]);
        assert!(layout.cells.iter().all(|c| !c.is_blank()));
    }

    #[test]
    fn two_lines_are_numbered_top_to_bottom() {
        let mut dots = cell_dots(20.0, 20.0, &[1, 2, 3, 4, 5, 6]);
        dots.extend(cell_dots(45.0, 20.0, &[1, 2, 4, 5]));
        dots.extend(cell_dots(20.0, 70.0, &[1, 3, 4, 6]));
        dots.extend(cell_dots(45.0, 70.0, &[1, 2, 3]));
        let layout = CellGrouper::new(GridParams::default()).group(&dots).expect("layout");

        assert_eq!(layout.lines, 2);
        let lines: Vec<(usize, usize)> = layout.cells.iter().map(|c| (c.line, c.column)).collect();
        assert_eq!(lines, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(masks(&layout), vec![63, 0b1_1011, 0b10_1101, 0b111]);

        for (i, a) in layout.cells.iter().enumerate() {
            assert_eq!(a.index, i);
            for b in &layout.cells[i + 1..] {
                assert!(!a.region.overlaps(&b.region), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn row_three_only_cell_uses_line_lattice() {
        // Three full lines fix the line pitch at 50; the fourth shows only dot 3.
        let mut dots = cell_dots(20.0, 20.0, &[1, 2, 3, 4, 5, 6]);
        dots.extend(cell_dots(20.0, 70.0, &[1, 2, 3, 4, 5, 6]));
        dots.extend(cell_dots(20.0, 120.0, &[1, 2, 3, 4, 5, 6]));
        dots.extend(cell_dots(20.0, 170.0, &[3]));
        let layout = CellGrouper::new(GridParams::default()).group(&dots).expect("layout");
        assert_eq!(masks(&layout), vec![63, 63, 63, 0b100]);
        assert_relative_eq!(layout.geometry.and_then(|g| g.line_pitch).expect("lp"), 50.0);
    }

    #[test]
    fn stray_dot_between_lines_leaves_both_lines_intact() {
        // "hello" over "world", cell pitch 25, line pitch 50.
        let words: [[&[u8]; 5]; 2] = [
            [&[1, 2, 5], &[1, 5], &[1, 2, 3], &[1, 2, 3], &[1, 3, 5]],
            [&[2, 4, 5, 6], &[1, 3, 5], &[1, 2, 3, 5], &[1, 2, 3], &[1, 4, 5]],
        ];
        let mut dots = Vec::new();
        for (line, word) in words.iter().enumerate() {
            for (i, positions) in word.iter().enumerate() {
                dots.extend(cell_dots(30.0 + 25.0 * i as f32, 30.0 + 50.0 * line as f32, positions));
            }
        }
        let clean = CellGrouper::new(GridParams::default()).group(&dots).expect("layout");

        dots.push(DotObservation::new(60.0, 65.0, 3.0));
        let noisy = CellGrouper::new(GridParams::default()).group(&dots).expect("layout");

        assert_eq!(noisy.lines, 2);
        assert_eq!(noisy.dropped_dots, 1);
        assert_eq!(masks(&noisy), masks(&clean));
        let world: Vec<u8> = noisy.line(1).map(|c| c.mask.bits()).collect();
        assert_eq!(world, vec![0b11_1010, 0b1_0101, 0b1_0111, 0b111, 0b1_1001]);
    }

    #[test]
    fn off_grid_dot_is_dropped() {
        let mut dots = cell_dots(30.0, 30.0, &[1, 2, 3, 4, 5, 6]);
        // Between rows 1 and 2 of the right column, just outside tolerance.
        dots.push(DotObservation::new(41.0, 35.0, 3.0));
        let layout = CellGrouper::new(GridParams::default()).group(&dots).expect("layout");
        assert_eq!(masks(&layout), vec![63]);
        assert_eq!(layout.dropped_dots, 1);
    }

    #[test]
    fn invalid_supplied_geometry_is_rejected() {
        let params = GridParams::with_geometry(GridGeometry::uniform(10.0, 5.0));
        let dots = cell_dots(20.0, 20.0, &[1]);
        assert!(matches!(
            CellGrouper::new(params).group(&dots),
            Err(GridInferenceError::InvalidGeometry(_))
        ));
    }
}
