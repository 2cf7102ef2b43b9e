use braille_grid::GridInferenceError;

/// The input could not be turned into a usable image.
#[derive(thiserror::Error, Debug)]
pub enum InvalidImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

impl From<image::ImageError> for InvalidImageError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => InvalidImageError::Io(io),
            other => InvalidImageError::Decode(other),
        }
    }
}

/// Errors produced by the recognition facade.
#[derive(thiserror::Error, Debug)]
pub enum OcrError {
    #[error(transparent)]
    InvalidImage(#[from] InvalidImageError),

    #[error(transparent)]
    Grid(#[from] GridInferenceError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to write annotated image: {0}")]
    Export(#[source] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
