//! Row bands (text lines) and their dot-row reference.

use braille_core::{estimate_mode, DotObservation};
use log::debug;

/// Dots sharing one coordinate within tolerance.
#[derive(Clone, Debug)]
pub(crate) struct Cluster1d {
    pub center: f32,
    pub members: Vec<usize>,
}

/// Group dot indices whose `coord` lies within `tol` of the running
/// cluster centre. Input order does not matter; clusters come out sorted.
pub(crate) fn cluster_1d(
    dots: &[DotObservation],
    indices: &[usize],
    coord: impl Fn(&DotObservation) -> f32,
    tol: f32,
) -> Vec<Cluster1d> {
    let mut sorted: Vec<usize> = indices.to_vec();
    sorted.sort_by(|&a, &b| coord(&dots[a]).total_cmp(&coord(&dots[b])));

    let mut clusters: Vec<Cluster1d> = Vec::new();
    let mut sum = 0.0f32;
    for idx in sorted {
        let v = coord(&dots[idx]);
        match clusters.last_mut() {
            Some(c) if v - c.center <= tol => {
                c.members.push(idx);
                sum += v;
                c.center = sum / c.members.len() as f32;
            }
            _ => {
                clusters.push(Cluster1d {
                    center: v,
                    members: vec![idx],
                });
                sum = v;
            }
        }
    }
    clusters
}

/// One text line worth of dots.
#[derive(Clone, Debug)]
pub(crate) struct RowBand {
    pub dots: Vec<usize>,
    /// Observed dot rows, top to bottom.
    pub rows: Vec<f32>,
    /// y coordinate of dot row 1, once resolved.
    pub top: f32,
}

impl RowBand {
    fn first_row(&self) -> f32 {
        self.rows.first().copied().unwrap_or(self.top)
    }

    fn last_row(&self) -> f32 {
        self.rows.last().copied().unwrap_or(self.top)
    }

    /// Whether rows 1 and 3 are both observed, which pins the reference.
    fn spans_full_height(&self, pitch_y: f32) -> bool {
        self.last_row() - self.first_row() >= 1.5 * pitch_y
    }
}

/// Whether two dot rows `gap` apart can belong to one cell (one or two
/// dot pitches, within `tol`).
fn fits_row_lattice(gap: f32, pitch_y: f32, tol: f32) -> bool {
    let k = (gap / pitch_y).round();
    (1.0..=2.0).contains(&k) && (gap - k * pitch_y).abs() <= tol
}

/// Text lines plus the dots rejected as stray rows.
#[derive(Clone, Debug, Default)]
pub(crate) struct RowBands {
    pub bands: Vec<RowBand>,
    pub noise: Vec<usize>,
}

/// Split dots into text lines.
///
/// Dot rows are clustered page-wide first. A row holding a single dot is
/// noise when other rows lie within one cell height plus `slack` but none
/// of them sits on the row lattice. Remaining rows join the current line
/// while they stay within a cell height of its first row and one or two
/// pitches below its last row.
pub(crate) fn split_row_bands(
    dots: &[DotObservation],
    pitch_y: f32,
    slack: f32,
    row_tol: f32,
) -> RowBands {
    let all: Vec<usize> = (0..dots.len()).collect();
    let rows = cluster_1d(dots, &all, |d| d.center.y, row_tol);
    let reach = 2.0 * pitch_y + slack;

    let is_stray = |i: usize| {
        let row = &rows[i];
        if row.members.len() > 1 {
            return false;
        }
        let gaps: Vec<f32> = rows
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, other)| (other.center - row.center).abs())
            .filter(|&gap| gap <= reach)
            .collect();
        !gaps.is_empty() && !gaps.iter().any(|&g| fits_row_lattice(g, pitch_y, row_tol))
    };

    let mut out = RowBands::default();
    let mut groups: Vec<Vec<&Cluster1d>> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if is_stray(i) {
            debug!("stray dot row at y={:.1}", row.center);
            out.noise.extend(&row.members);
            continue;
        }
        match groups.last_mut() {
            Some(g)
                if row.center - g[0].center <= reach
                    && fits_row_lattice(row.center - g[g.len() - 1].center, pitch_y, row_tol) =>
            {
                g.push(row)
            }
            _ => groups.push(vec![row]),
        }
    }

    out.bands = groups
        .into_iter()
        .map(|group| RowBand {
            dots: group.iter().flat_map(|r| r.members.iter().copied()).collect(),
            rows: group.iter().map(|r| r.center).collect(),
            top: group[0].center,
        })
        .collect();
    out
}

/// Resolve the row-1 reference of bands that do not show all three rows.
///
/// Bands spanning rows 1..3 are anchors. When the gaps between anchors
/// agree on a line pitch (at least two of them) or one is supplied, an
/// incomplete band takes the candidate top (topmost row as row 1, 2 or 3)
/// that best fits the line lattice.
/// Otherwise the topmost observed row is taken as row 1.
pub(crate) fn resolve_band_tops(
    bands: &mut [RowBand],
    pitch_y: f32,
    line_pitch: Option<f32>,
    tol: f32,
) -> Option<f32> {
    let anchors: Vec<f32> = bands
        .iter()
        .filter(|b| b.spans_full_height(pitch_y))
        .map(|b| b.first_row())
        .collect();

    let line_pitch = line_pitch.or_else(|| {
        let diffs: Vec<f32> = anchors.windows(2).map(|w| w[1] - w[0]).collect();
        estimate_mode(&diffs, 0.1)
            .filter(|m| m.support >= 2)
            .map(|m| m.value)
    });

    for band in bands.iter_mut() {
        let first = band.first_row();
        band.top = first;
        if band.spans_full_height(pitch_y) {
            continue;
        }
        let (Some(lp), false) = (line_pitch, anchors.is_empty()) else {
            continue;
        };

        let last = band.last_row();
        let lattice_error = |cand: f32| {
            anchors
                .iter()
                .map(|a| {
                    let k = ((cand - a) / lp).round();
                    (cand - a - k * lp).abs()
                })
                .fold(f32::INFINITY, f32::min)
        };

        let best = (0..3)
            .map(|shift| first - shift as f32 * pitch_y)
            .filter(|&cand| last - cand <= 2.0 * pitch_y + tol)
            .map(|cand| (cand, lattice_error(cand)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((cand, err)) = best {
            if err <= tol {
                band.top = cand;
            }
        }
    }

    line_pitch
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dot(x: f32, y: f32) -> DotObservation {
        DotObservation::new(x, y, 3.0)
    }

    #[test]
    fn clusters_nearby_values() {
        let dots = vec![dot(10.0, 0.0), dot(30.0, 0.0), dot(11.0, 0.0), dot(31.5, 0.0)];
        let clusters = cluster_1d(&dots, &[0, 1, 2, 3], |d| d.center.x, 3.0);
        assert_eq!(clusters.len(), 2);
        assert_relative_eq!(clusters[0].center, 10.5);
        assert_eq!(clusters[1].members.len(), 2);
    }

    #[test]
    fn bands_split_on_cell_height() {
        // Two lines at y=20 and y=60, pitch 10.
        let dots = vec![
            dot(10.0, 20.0),
            dot(10.0, 40.0),
            dot(20.0, 30.0),
            dot(10.0, 60.0),
            dot(20.0, 80.0),
        ];
        let split = split_row_bands(&dots, 10.0, 5.0, 3.5);
        assert!(split.noise.is_empty());
        assert_eq!(split.bands.len(), 2);
        assert_eq!(split.bands[0].dots.len(), 3);
        assert_eq!(split.bands[0].rows.len(), 3);
        assert_eq!(split.bands[1].rows, vec![60.0, 80.0]);
    }

    #[test]
    fn stray_dot_between_lines_is_noise() {
        // Full-height lines at y=30 and y=80; a lone dot sits in the gap.
        let mut dots = Vec::new();
        for top in [30.0, 80.0] {
            for row in 0..3 {
                dots.push(dot(30.0, top + 10.0 * row as f32));
                dots.push(dot(40.0, top + 10.0 * row as f32));
            }
        }
        dots.push(dot(60.0, 65.0));

        let split = split_row_bands(&dots, 10.0, 5.0, 3.5);
        assert_eq!(split.noise, vec![12]);
        assert_eq!(split.bands.len(), 2);
        assert_eq!(split.bands[1].rows, vec![80.0, 90.0, 100.0]);
        assert!(split.bands.iter().all(|b| b.dots.len() == 6));
    }

    #[test]
    fn lone_dot_line_is_kept() {
        let dots = vec![dot(10.0, 20.0), dot(10.0, 30.0), dot(10.0, 40.0), dot(10.0, 90.0)];
        let split = split_row_bands(&dots, 10.0, 5.0, 3.5);
        assert!(split.noise.is_empty());
        assert_eq!(split.bands.len(), 2);
        assert_eq!(split.bands[1].rows, vec![90.0]);
    }

    #[test]
    fn incomplete_band_snaps_to_line_lattice() {
        // Anchors at 20, 60 and 100 (line pitch 40); the last line shows
        // only rows 2 and 3.
        let dots = vec![
            dot(10.0, 20.0),
            dot(10.0, 40.0),
            dot(10.0, 60.0),
            dot(10.0, 80.0),
            dot(10.0, 100.0),
            dot(10.0, 120.0),
            dot(10.0, 150.0),
            dot(10.0, 160.0),
        ];
        let mut bands = split_row_bands(&dots, 10.0, 5.0, 3.5).bands;
        assert_eq!(bands.len(), 4);
        let lp = resolve_band_tops(&mut bands, 10.0, None, 3.5);
        assert_relative_eq!(lp.expect("line pitch"), 40.0);
        assert_relative_eq!(bands[3].top, 140.0);
    }

    #[test]
    fn single_anchor_gap_gives_no_line_pitch() {
        let dots = vec![
            dot(10.0, 20.0),
            dot(10.0, 40.0),
            dot(10.0, 65.0),
            dot(10.0, 85.0),
            dot(10.0, 120.0),
            dot(10.0, 130.0),
        ];
        let mut bands = split_row_bands(&dots, 10.0, 5.0, 3.5).bands;
        assert_eq!(bands.len(), 3);
        assert!(resolve_band_tops(&mut bands, 10.0, None, 3.5).is_none());
        assert_relative_eq!(bands[2].top, 120.0);
    }

    #[test]
    fn incomplete_band_without_anchor_uses_topmost_row() {
        let dots = vec![dot(10.0, 30.0), dot(35.0, 30.0)];
        let mut bands = split_row_bands(&dots, 10.0, 5.0, 3.5).bands;
        assert!(resolve_band_tops(&mut bands, 10.0, None, 3.5).is_none());
        assert_relative_eq!(bands[0].top, 30.0);
    }
}
