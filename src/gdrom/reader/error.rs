use crate::gdrom::disc::error::DiscError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    DiscError(#[from] DiscError),
}

pub type ReaderResult<T> = Result<T, ReaderError>;
