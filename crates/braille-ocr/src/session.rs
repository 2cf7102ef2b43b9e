use std::path::{Path, PathBuf};

use braille_core::{Cell, DotObservation, GrayImageView};
use braille_decode::BrailleDecoder;
use braille_dots::{normalize, DotDetection, DotDetector};
use braille_grid::{CellGrouper, GridGeometry, GridLayout};
use image::{DynamicImage, GrayImage, RgbImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::annotate::Annotator;
use crate::error::{InvalidImageError, OcrError};
use crate::params::OcrParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Extensions accepted by [`is_supported_extension`].
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Whether `path` names a PNG or JPEG file.
pub fn is_supported_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Where the annotated copy of `input` is written: `<stem>-proc.png` next
/// to the input.
pub fn processed_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("braille");
    input.with_file_name(format!("{stem}-proc.png"))
}

/// Borrow an `image::GrayImage` as a `braille-core` view.
pub fn gray_view(img: &GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// One loaded page and its recognition state.
///
/// Stages run lazily and at most once: dots are detected on the first call
/// that needs them and the cell layout is cached afterwards. The annotated
/// copy of the page starts as the RGB source and changes only through
/// [`BrailleSession::mark`].
pub struct BrailleSession {
    params: OcrParams,
    gray: GrayImage,
    annotated: RgbImage,
    detection: Option<DotDetection>,
    layout: Option<GridLayout>,
}

impl BrailleSession {
    /// Open and decode an image file.
    pub fn open(path: impl AsRef<Path>, params: OcrParams) -> Result<Self, OcrError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(InvalidImageError::from)?;
        info!("loaded {} ({}x{})", path.display(), img.width(), img.height());
        Self::from_dynamic(img, params)
    }

    /// Decode an in-memory encoded image (PNG, JPEG, ...).
    pub fn from_bytes(bytes: &[u8], params: OcrParams) -> Result<Self, OcrError> {
        let img = image::load_from_memory(bytes).map_err(InvalidImageError::from)?;
        Self::from_dynamic(img, params)
    }

    pub fn from_dynamic(img: DynamicImage, params: OcrParams) -> Result<Self, OcrError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(InvalidImageError::EmptyImage {
                width: img.width(),
                height: img.height(),
            }
            .into());
        }
        Ok(Self {
            params,
            gray: img.to_luma8(),
            annotated: img.to_rgb8(),
            detection: None,
            layout: None,
        })
    }

    pub fn params(&self) -> &OcrParams {
        &self.params
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }

    /// Illumination-normalized working buffer.
    pub fn normalized(&self) -> braille_core::GrayImage {
        normalize(&gray_view(&self.gray), &self.params.preprocess)
    }

    /// Detected dots with filtering diagnostics.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(width = self.gray.width(), height = self.gray.height()))
    )]
    pub fn detection(&mut self) -> &DotDetection {
        let (gray, params) = (&self.gray, &self.params);
        self.detection.get_or_insert_with(|| {
            let normalized = normalize(&gray_view(gray), &params.preprocess);
            let detection =
                DotDetector::new(params.dots.clone()).detect_with_diagnostics(&normalized.view());
            debug!("{} dots detected", detection.dots.len());
            detection
        })
    }

    pub fn dots(&mut self) -> &[DotObservation] {
        &self.detection().dots
    }

    /// Inferred cell layout of the page.
    pub fn layout(&mut self) -> Result<&GridLayout, OcrError> {
        let layout = match self.layout.take() {
            Some(layout) => layout,
            None => {
                let grouper = CellGrouper::new(self.params.grid.clone());
                let layout = grouper.group(&self.detection().dots)?;
                info!(
                    "{} cells on {} lines ({} dots dropped)",
                    layout.cells.len(),
                    layout.lines,
                    layout.dropped_dots
                );
                layout
            }
        };
        Ok(&*self.layout.insert(layout))
    }

    /// Cells in reading order. Runs detection and grouping on first use.
    pub fn cells(&mut self) -> Result<Vec<Cell>, OcrError> {
        Ok(self.layout()?.cells.clone())
    }

    /// Draw `cell` onto the annotated copy of the page.
    pub fn mark(&mut self, cell: &Cell) {
        let dots = self
            .detection
            .as_ref()
            .map(|d| d.dots.as_slice())
            .unwrap_or(&[]);
        Annotator::new(&mut self.annotated, self.params.annotation).mark(cell, dots);
    }

    /// The page with every marked cell drawn on it.
    pub fn annotated(&self) -> &RgbImage {
        &self.annotated
    }

    pub fn save_annotated(&self, path: impl AsRef<Path>) -> Result<(), OcrError> {
        self.annotated.save(path.as_ref()).map_err(OcrError::Export)?;
        info!("annotated image written to {}", path.as_ref().display());
        Ok(())
    }
}

/// Result of recognizing one page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub width: u32,
    pub height: u32,
    pub dot_count: usize,
    pub lines: usize,
    pub dropped_dots: usize,
    pub geometry: Option<GridGeometry>,
    pub cells: Vec<Cell>,
}

/// Mark and decode every cell of the page.
///
/// The decoder is fed in reading order; its digest after the last cell
/// becomes the transcription text.
pub fn recognize(
    session: &mut BrailleSession,
    decoder: &mut BrailleDecoder,
) -> Result<Transcription, OcrError> {
    let cells = session.cells()?;
    for cell in &cells {
        session.mark(cell);
        decoder.push(cell);
    }

    let (width, height) = session.dimensions();
    let dot_count = session.dots().len();
    let layout = session.layout()?;
    Ok(Transcription {
        text: decoder.digest(),
        width,
        height,
        dot_count,
        lines: layout.lines,
        dropped_dots: layout.dropped_dots,
        geometry: layout.geometry,
        cells,
    })
}
