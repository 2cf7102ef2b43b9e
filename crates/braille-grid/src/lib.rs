//! Braille cell grid inference on top of `braille-core`.
//!
//! ## Quickstart
//!
//! ```
//! use braille_core::DotObservation;
//! use braille_grid::{CellGrouper, GridParams};
//!
//! let dots: Vec<DotObservation> = [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
//!     .iter()
//!     .map(|&(c, r)| DotObservation::new(20.0 + 10.0 * c as f32, 20.0 + 10.0 * r as f32, 3.0))
//!     .collect();
//! let layout = CellGrouper::new(GridParams::default()).group(&dots).unwrap();
//! assert_eq!(layout.cells.len(), 1);
//! assert_eq!(layout.cells[0].mask.bits(), 63);
//! ```
//!
//! Algorithm:
//! 1. Estimate the dot pitch from nearest axis-adjacent neighbours (kd-tree).
//! 2. Cluster dot rows page-wide, drop lone dots off the row lattice and
//!    group rows into text lines one cell height tall; resolve each line's
//!    row-1 reference, using the line lattice when a line shows fewer than
//!    three dot rows.
//! 3. Cluster each band into dot columns and pair columns one pitch apart.
//!    Measure the inter-cell pitch and lattice phase from paired cells and
//!    use them to classify lone columns as left or right.
//! 4. Assign dots to the nearest of six slots, dropping off-grid noise.
//! 5. Insert blank cells at word gaps and number cells in reading order.

mod bands;
mod columns;
mod error;
mod grouper;
mod params;
mod pitch;

pub use error::GridInferenceError;
pub use grouper::{CellGrouper, GridLayout};
pub use params::{GridGeometry, GridParams};
pub use pitch::{estimate_dot_pitch, PitchEstimate};
