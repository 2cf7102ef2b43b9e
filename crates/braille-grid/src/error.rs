/// Grid geometry could not be established from the observed dots.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridInferenceError {
    #[error("not enough dots to infer a cell grid (found {found}, need at least {required})")]
    InsufficientDots { found: usize, required: usize },
    #[error("no stable dot pitch among {samples} spacing samples")]
    NoStablePitch { samples: usize },
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),
}
