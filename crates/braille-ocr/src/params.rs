use std::path::Path;

use braille_decode::DecoderParams;
use braille_dots::{DotDetectorParams, PreprocessParams};
use braille_grid::GridParams;
use serde::{Deserialize, Serialize};

use crate::annotate::AnnotationStyle;
use crate::error::OcrError;

/// Settings of every pipeline stage.
///
/// Every field falls back to its default, so a config file only needs the
/// values it changes:
///
/// ```json
/// { "dots": { "resolution_dpi": 300.0 }, "decoder": { "table": "unicode" } }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrParams {
    pub preprocess: PreprocessParams,
    pub dots: DotDetectorParams,
    pub grid: GridParams,
    pub decoder: DecoderParams,
    pub annotation: AnnotationStyle,
}

impl OcrParams {
    pub fn from_json_str(json: &str) -> Result<Self, OcrError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load parameters from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OcrError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braille_decode::BrailleTable;
    use braille_dots::DotPolarity;

    #[test]
    fn partial_config_keeps_defaults() {
        let params = OcrParams::from_json_str(
            r#"{ "preprocess": { "polarity": "bright" }, "decoder": { "table": "unicode" } }"#,
        )
        .expect("params");
        assert_eq!(params.preprocess.polarity, DotPolarity::Bright);
        assert_eq!(params.decoder.table, BrailleTable::Unicode);
        assert_eq!(params.grid.min_dots, 6);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(matches!(
            OcrParams::from_json_str("{ nope"),
            Err(OcrError::Config(_))
        ));
    }
}
