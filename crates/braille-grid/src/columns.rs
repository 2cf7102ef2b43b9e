//! Dot columns inside a row band and their grouping into cells.

use braille_core::{circular_mean, estimate_mode, DotObservation};

use crate::bands::{cluster_1d, Cluster1d};

/// How the dot columns of a band were grouped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ColumnGroup {
    /// Two columns at the intra-cell pitch: left and right of one cell.
    Paired(usize, usize),
    /// A column without a partner; its side is decided later.
    Single(usize),
}

/// Dot columns of one band plus their pairing.
#[derive(Clone, Debug)]
pub(crate) struct BandColumns {
    pub columns: Vec<Cluster1d>,
    pub groups: Vec<ColumnGroup>,
}

impl BandColumns {
    /// x of the left column of every paired cell, left to right.
    pub fn paired_origins(&self) -> impl Iterator<Item = f32> + '_ {
        self.groups.iter().filter_map(|g| match *g {
            ColumnGroup::Paired(l, _) => Some(self.columns[l].center),
            ColumnGroup::Single(_) => None,
        })
    }
}

/// Cluster the band's dots into columns and pair neighbours that sit one
/// dot pitch apart.
pub(crate) fn split_columns(
    dots: &[DotObservation],
    band: &[usize],
    pitch_x: f32,
    tol: f32,
) -> BandColumns {
    let columns = cluster_1d(dots, band, |d| d.center.x, tol);

    let mut groups = Vec::with_capacity(columns.len());
    let mut i = 0;
    while i < columns.len() {
        let paired = columns
            .get(i + 1)
            .map(|next| (next.center - columns[i].center - pitch_x).abs() <= tol)
            .unwrap_or(false);
        if paired {
            groups.push(ColumnGroup::Paired(i, i + 1));
            i += 2;
        } else {
            groups.push(ColumnGroup::Single(i));
            i += 1;
        }
    }

    BandColumns { columns, groups }
}

/// Inter-cell pitch from the spacing of paired cells.
///
/// A spacing spanning several cells is divided by the nearest whole number
/// of nominal pitches before voting.
pub(crate) fn estimate_cell_pitch(
    bands: &[BandColumns],
    pitch_x: f32,
    ratio: f32,
    rel_tol: f32,
) -> Option<f32> {
    let nominal = ratio * pitch_x;
    let samples: Vec<f32> = bands
        .iter()
        .flat_map(|b| {
            let origins: Vec<f32> = b.paired_origins().collect();
            origins
                .windows(2)
                .map(|w| w[1] - w[0])
                .filter(|&d| d >= 1.8 * pitch_x)
                .map(|d| d / (d / nominal).round().max(1.0))
                .collect::<Vec<_>>()
        })
        .collect();

    estimate_mode(&samples, rel_tol)
        .filter(|m| m.support >= 2 || m.total == 1)
        .map(|m| m.value)
}

/// Page-level phase of the cell lattice, from paired cell origins.
pub(crate) fn lattice_phase(bands: &[BandColumns], cell_pitch: f32) -> Option<f32> {
    let origins: Vec<f32> = bands.iter().flat_map(|b| b.paired_origins()).collect();
    circular_mean(&origins, cell_pitch)
}

/// A cell candidate: its origin (left column x) and the dots it owns.
#[derive(Clone, Debug)]
pub(crate) struct CellSpan {
    pub origin: f32,
    pub dots: Vec<usize>,
}

/// Distance from `x` to the nearest lattice node `reference + k * period`.
fn lattice_residual(x: f32, reference: f32, period: f32) -> f32 {
    let r = (x - reference).rem_euclid(period);
    r.min(period - r)
}

/// Turn column groups into cell spans ordered left to right.
///
/// A lone column is a left column unless reading it as a right column
/// fits the lattice better. The lattice reference is the nearest paired
/// cell of the same band, else the page phase.
pub(crate) fn assemble_cells(
    band: &BandColumns,
    pitch_x: f32,
    cell_pitch: f32,
    phase: Option<f32>,
) -> Vec<CellSpan> {
    let origins: Vec<f32> = band.paired_origins().collect();
    let mut spans: Vec<CellSpan> = Vec::with_capacity(band.groups.len());

    for group in &band.groups {
        match *group {
            ColumnGroup::Paired(l, r) => {
                let mut dots = band.columns[l].members.clone();
                dots.extend_from_slice(&band.columns[r].members);
                spans.push(CellSpan {
                    origin: band.columns[l].center,
                    dots,
                });
            }
            ColumnGroup::Single(c) => {
                let x = band.columns[c].center;
                let reference = origins
                    .iter()
                    .copied()
                    .min_by(|a, b| (a - x).abs().total_cmp(&(b - x).abs()))
                    .or(phase);
                let origin = match reference {
                    Some(r)
                        if lattice_residual(x - pitch_x, r, cell_pitch)
                            < lattice_residual(x, r, cell_pitch) =>
                    {
                        x - pitch_x
                    }
                    _ => x,
                };
                spans.push(CellSpan {
                    origin,
                    dots: band.columns[c].members.clone(),
                });
            }
        }
    }

    spans.sort_by(|a, b| a.origin.total_cmp(&b.origin));

    // Two lone columns of the same cell that missed pairing.
    let mut merged: Vec<CellSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(prev) if span.origin - prev.origin < 0.5 * pitch_x => {
                prev.dots.extend(span.dots);
            }
            _ => merged.push(span),
        }
    }
    merged
}
