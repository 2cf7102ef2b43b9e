use serde::{Deserialize, Serialize};

/// Global layout parameters of a Braille page, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Horizontal distance between the two dot columns of a cell.
    pub dot_pitch_x: f32,
    /// Vertical distance between adjacent dot rows of a cell.
    pub dot_pitch_y: f32,
    /// Distance between the same slot in horizontally adjacent cells.
    pub cell_pitch_x: f32,
    /// Distance between the tops of consecutive lines, when known.
    #[serde(default)]
    pub line_pitch: Option<f32>,
    /// Page-level x offset of the cell lattice modulo `cell_pitch_x`.
    #[serde(default)]
    pub column_phase: Option<f32>,
}

impl GridGeometry {
    /// Square dot pitch with the given inter-cell pitch.
    pub fn uniform(dot_pitch: f32, cell_pitch: f32) -> Self {
        Self {
            dot_pitch_x: dot_pitch,
            dot_pitch_y: dot_pitch,
            cell_pitch_x: cell_pitch,
            line_pitch: None,
            column_phase: None,
        }
    }

    /// Height of a cell measured between dot centres of rows 1 and 3.
    pub fn cell_height(&self) -> f32 {
        2.0 * self.dot_pitch_y
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.dot_pitch_x, self.dot_pitch_y, self.cell_pitch_x]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
            && self.cell_pitch_x > self.dot_pitch_x
    }
}

/// Parameters of the cell grouper.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Minimal number of dots needed to bootstrap pitch estimation.
    pub min_dots: usize,
    /// Known page geometry; skips pitch estimation when set.
    pub geometry: Option<GridGeometry>,
    /// Neighbour search radius as a multiple of the median dot radius.
    pub neighbor_radius_factor: f32,
    /// Explicit neighbour search radius in pixels.
    pub max_pitch_px: Option<f32>,
    /// Two dots are axis-adjacent when the off-axis offset is at most this
    /// fraction of the on-axis offset.
    pub axis_tolerance: f32,
    /// Relative window used when clustering spacing samples.
    pub pitch_tolerance: f32,
    /// Minimal fraction of spacing samples supporting the pitch mode.
    pub min_pitch_support: f32,
    /// Inter-cell pitch as a multiple of the dot pitch when it cannot be measured.
    pub cell_pitch_ratio: f32,
    /// Extra slack, in dot pitches, added to the cell height when banding lines.
    pub band_tolerance: f32,
    /// Dots within this fraction of the pitch share a dot row or column.
    pub column_tolerance: f32,
    /// Dots farther than this fraction of the pitch from every slot are dropped.
    pub slot_tolerance: f32,
    /// A gap between cell origins wider than this many cell pitches is a space.
    pub word_gap_factor: f32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            min_dots: 6,
            geometry: None,
            neighbor_radius_factor: 8.0,
            max_pitch_px: None,
            axis_tolerance: 0.35,
            pitch_tolerance: 0.15,
            min_pitch_support: 0.3,
            cell_pitch_ratio: 2.5,
            band_tolerance: 0.5,
            column_tolerance: 0.35,
            slot_tolerance: 0.5,
            word_gap_factor: 1.5,
        }
    }
}

impl GridParams {
    pub fn with_geometry(geometry: GridGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Self::default()
        }
    }
}
