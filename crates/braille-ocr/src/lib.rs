//! High-level facade for the `braille-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates (`core`, `dots`, `grid`, `decode`)
//! - [`BrailleSession`]: load a photo or scan, run preprocessing, dot
//!   detection and cell grouping, and mark recognized cells on a copy of
//!   the page
//! - [`recognize`]: the whole pipeline in one call, producing a
//!   serializable [`Transcription`]
//!
//! ## Quickstart
//!
//! ```no_run
//! use braille_ocr::{recognize, BrailleDecoder, BrailleSession, OcrParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = OcrParams::default();
//! let mut decoder = BrailleDecoder::new(params.decoder.clone());
//! let mut session = BrailleSession::open("page.jpg", params)?;
//!
//! for cell in session.cells()? {
//!     session.mark(&cell);
//!     decoder.push(&cell);
//! }
//! session.save_annotated("page-proc.png")?;
//! println!("{}", decoder.digest());
//!
//! // Or in one go:
//! let mut session = BrailleSession::open("page.jpg", OcrParams::default())?;
//! let transcription = recognize(&mut session, &mut BrailleDecoder::default())?;
//! println!("{}", transcription.text);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `braille_ocr::core`: masks, cells, regions, gray buffers, logging.
//! - `braille_ocr::dots`: illumination normalization and dot detection.
//! - `braille_ocr::grid`: pitch estimation and cell grouping.
//! - `braille_ocr::decode`: pattern tables and the text decoder.

pub use braille_core as core;
pub use braille_decode as decode;
pub use braille_dots as dots;
pub use braille_grid as grid;

pub use braille_core::{Cell, CellKind, CellRegion, DotMask, DotObservation};
pub use braille_decode::{BrailleDecoder, BrailleTable, DecoderParams};
pub use braille_grid::{GridGeometry, GridInferenceError, GridLayout};

pub mod annotate;
mod error;
mod params;
mod session;

pub use annotate::{AnnotationStyle, Annotator};
pub use error::{InvalidImageError, OcrError};
pub use params::OcrParams;
pub use session::{
    gray_view, is_supported_extension, processed_path, recognize, BrailleSession, Transcription,
    SUPPORTED_EXTENSIONS,
};
