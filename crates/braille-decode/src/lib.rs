//! Braille pattern tables and the text decoder.
//!
//! ```
//! use braille_core::DotMask;
//! use braille_decode::{BrailleDecoder, DecoderParams};
//!
//! let mut decoder = BrailleDecoder::new(DecoderParams::default());
//! decoder.push_mask(0, DotMask::from_positions(&[1, 2, 5]));
//! decoder.push_mask(0, DotMask::from_positions(&[2, 4]));
//! assert_eq!(decoder.digest(), "hi");
//! ```

mod decoder;
mod table;

pub use decoder::{BrailleDecoder, DecoderParams, TextUnit, DEFAULT_PLACEHOLDER};
pub use table::{BrailleTable, Symbol};
