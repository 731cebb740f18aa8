use crate::gdrom::disc::error::DiscError;
use crate::gdrom::gdi::error::GdiError;
use crate::gdrom::reader::error::ReaderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GdRomError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    GdiError(#[from] GdiError),

    #[error(transparent)]
    DiscError(#[from] DiscError),

    #[error(transparent)]
    ReaderError(#[from] ReaderError),

    #[error("Missing backing file: {0}")]
    MissingBackingFile(String),

    #[error("Invalid track geometry: {0}")]
    InvalidTrackGeometry(String),

    #[error("Track {0} is not present in the descriptor")]
    TrackNotPresent(u8),

    #[error("Output file already exists, use --force to overwrite")]
    OutputFileAlreadyExists,

    #[error("Track {0} does not start with a CD sync pattern")]
    CorruptTrackData(u8),
}

pub type GdRomResult<T> = Result<T, GdRomError>;
