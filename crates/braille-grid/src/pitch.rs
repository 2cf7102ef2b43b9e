//! Dot pitch estimation from nearest axis-adjacent neighbours.

use braille_core::{estimate_mode, median, DotObservation, ModeEstimate};
use kiddo::{KdTree, SquaredEuclidean};
use log::{debug, warn};

use crate::error::GridInferenceError;
use crate::params::GridParams;

/// Estimated intra-cell dot pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchEstimate {
    pub x: f32,
    pub y: f32,
    /// Mode over horizontal and vertical samples combined.
    pub combined: ModeEstimate,
}

/// Per-dot spacing samples: the nearest horizontal and the nearest vertical
/// neighbour distance, when such neighbours exist.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpacingSamples {
    pub horizontal: Vec<f32>,
    pub vertical: Vec<f32>,
}

/// Neighbours queried per dot when the radius search finds nothing.
const FALLBACK_NEIGHBORS: usize = 8;

impl SpacingSamples {
    fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }
}

pub(crate) fn collect_spacing_samples(
    dots: &[DotObservation],
    params: &GridParams,
) -> SpacingSamples {
    if dots.len() < 2 {
        return SpacingSamples::default();
    }

    let radii: Vec<f32> = dots.iter().map(|d| d.radius).collect();
    let r = median(&radii).unwrap_or(1.0).max(0.5);
    let search = params
        .max_pitch_px
        .unwrap_or(r * params.neighbor_radius_factor);

    let coords: Vec<[f32; 2]> = dots.iter().map(|d| [d.center.x, d.center.y]).collect();
    let tree: KdTree<f32, 2> = (&coords).into();

    let samples = axis_samples(&coords, params, r, |q| {
        tree.within_unsorted::<SquaredEuclidean>(q, search * search)
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance))
            .collect()
    });
    if !samples.is_empty() || params.max_pitch_px.is_some() {
        return samples;
    }

    // Dots small against their spacing: no neighbour inside the radius.
    debug!("no neighbours within {search:.1}px, using {FALLBACK_NEIGHBORS} nearest");
    axis_samples(&coords, params, r, |q| {
        tree.nearest_n::<SquaredEuclidean>(q, FALLBACK_NEIGHBORS + 1)
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance))
            .collect()
    })
}

/// Nearest horizontal and vertical neighbour distance of every dot among
/// the candidates returned by `neighbours` (index, squared distance).
fn axis_samples(
    coords: &[[f32; 2]],
    params: &GridParams,
    min_dist: f32,
    neighbours: impl Fn(&[f32; 2]) -> Vec<(usize, f32)>,
) -> SpacingSamples {
    let mut samples = SpacingSamples::default();
    for (i, q) in coords.iter().enumerate() {
        let mut best_h: Option<f32> = None;
        let mut best_v: Option<f32> = None;

        for (j, dist2) in neighbours(q) {
            if j == i || dist2 < min_dist * min_dist {
                continue;
            }
            let dx = (coords[j][0] - q[0]).abs();
            let dy = (coords[j][1] - q[1]).abs();
            if dy <= params.axis_tolerance * dx {
                best_h = Some(best_h.map_or(dx, |b| b.min(dx)));
            } else if dx <= params.axis_tolerance * dy {
                best_v = Some(best_v.map_or(dy, |b| b.min(dy)));
            }
        }

        samples.horizontal.extend(best_h);
        samples.vertical.extend(best_v);
    }
    samples
}

/// Estimate the horizontal and vertical dot pitch.
///
/// The combined mode must be supported by at least two samples and by
/// `min_pitch_support` of all samples. Each axis takes the mode of its own
/// samples near the combined value, else the combined value.
pub fn estimate_dot_pitch(
    dots: &[DotObservation],
    params: &GridParams,
) -> Result<PitchEstimate, GridInferenceError> {
    let samples = collect_spacing_samples(dots, params);
    let all: Vec<f32> = samples
        .horizontal
        .iter()
        .chain(samples.vertical.iter())
        .copied()
        .collect();

    let Some(combined) = estimate_mode(&all, params.pitch_tolerance) else {
        warn!("no axis-aligned neighbours among {} dots", dots.len());
        return Err(GridInferenceError::NoStablePitch { samples: 0 });
    };
    if combined.support < 2 || combined.support_fraction() < params.min_pitch_support {
        warn!(
            "pitch mode {:.2}px has weak support {}/{}",
            combined.value, combined.support, combined.total
        );
        return Err(GridInferenceError::NoStablePitch {
            samples: combined.total,
        });
    }

    // Gaps between cells (about 1.5 pitches) must not outvote the pitch.
    let axis = |values: &[f32]| {
        let near: Vec<f32> = values
            .iter()
            .copied()
            .filter(|v| (v / combined.value - 1.0).abs() <= 0.35)
            .collect();
        estimate_mode(&near, params.pitch_tolerance)
            .filter(|m| m.support >= 2)
            .map(|m| m.value)
            .unwrap_or(combined.value)
    };
    let estimate = PitchEstimate {
        x: axis(&samples.horizontal),
        y: axis(&samples.vertical),
        combined,
    };
    debug!(
        "dot pitch x={:.2}px y={:.2}px (support {}/{})",
        estimate.x, estimate.y, combined.support, combined.total
    );
    Ok(estimate)
}
