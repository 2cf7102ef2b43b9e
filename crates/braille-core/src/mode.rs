//! Robust 1-D statistics used for grid inference.
//!
//! Spacing samples collected from noisy dot sets are multi-modal: intra-cell
//! pitch, inter-cell gaps and line gaps all show up. The helpers here pick
//! the dominant mode by window clustering and summarize periodic offsets.

use serde::{Deserialize, Serialize};

/// Result of [`estimate_mode`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeEstimate {
    /// Mean of the samples supporting the mode.
    pub value: f32,
    /// Number of samples within the tolerance window of the mode.
    pub support: usize,
    /// Total number of finite samples considered.
    pub total: usize,
}

impl ModeEstimate {
    /// Fraction of samples that support the mode.
    pub fn support_fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.support as f32 / self.total as f32
        }
    }
}

/// Find the most populated cluster of positive samples.
///
/// Every sample `s` is a candidate centre; its support is the number of
/// samples in `[s * (1 - rel_tol), s * (1 + rel_tol)]`. The candidate with
/// the largest support wins, ties going to the smaller value. The returned
/// value is the mean of the supporting samples.
pub fn estimate_mode(samples: &[f32], rel_tol: f32) -> Option<ModeEstimate> {
    let mut sorted: Vec<f32> = samples
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f32::total_cmp);

    let tol = rel_tol.abs();
    let mut best: Option<(usize, usize)> = None; // (lo, hi) exclusive
    let mut lo = 0usize;
    let mut hi = 0usize;
    for &s in &sorted {
        let lower = s * (1.0 - tol);
        let upper = s * (1.0 + tol);
        while sorted[lo] < lower {
            lo += 1;
        }
        hi = hi.max(lo);
        while hi < sorted.len() && sorted[hi] <= upper {
            hi += 1;
        }
        let support = hi - lo;
        if best.map_or(true, |(b_lo, b_hi)| support > b_hi - b_lo) {
            best = Some((lo, hi));
        }
    }

    let (lo, hi) = best?;
    let window = &sorted[lo..hi];
    let value = window.iter().sum::<f32>() / window.len() as f32;
    Some(ModeEstimate {
        value,
        support: window.len(),
        total: sorted.len(),
    })
}

/// Median of finite samples.
pub fn median(samples: &[f32]) -> Option<f32> {
    let mut v: Vec<f32> = samples.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f32::total_cmp);
    let mid = v.len() / 2;
    Some(if v.len() % 2 == 0 {
        0.5 * (v[mid - 1] + v[mid])
    } else {
        v[mid]
    })
}

/// Mean of `values` taken modulo `period`, returned in `[0, period)`.
///
/// Returns `None` when the offsets cancel out (no dominant phase).
pub fn circular_mean(values: &[f32], period: f32) -> Option<f32> {
    if values.is_empty() || period <= 0.0 {
        return None;
    }
    let scale = std::f32::consts::TAU / period;
    let (s, c) = values.iter().fold((0.0f32, 0.0f32), |(s, c), v| {
        let (sin, cos) = (v * scale).sin_cos();
        (s + sin, c + cos)
    });
    let n = values.len() as f32;
    if (s / n).hypot(c / n) < 1e-3 {
        return None;
    }
    Some((s.atan2(c) / scale).rem_euclid(period))
}
