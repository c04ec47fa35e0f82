use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditDistanceError {
    /// A sequence reached the distance computation with no tokens.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Shape error: {0}")]
    Shape(String),
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditDistanceError {
    pub(crate) fn empty_sequence() -> Self {
        EditDistanceError::InvalidArgument("empty input sequence".to_string())
    }
}

pub type Result<T> = std::result::Result<T, EditDistanceError>;
