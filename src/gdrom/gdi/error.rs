use thiserror::Error;

#[derive(Debug, Error)]
pub enum GdiError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Duplicate track index: {0}")]
    DuplicateTrackIndex(u8),

    #[error("Invalid track geometry: {0}")]
    InvalidTrackGeometry(String),
}

pub type GdiResult<T> = Result<T, GdiError>;
