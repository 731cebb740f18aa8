use thiserror::Error;

/// Recoverable query-time errors. The drive controller maps these to
/// sense-key style responses instead of failing the mount.
#[derive(Debug, Error)]
pub enum DiscError {
    #[error("Track index {index} is out of range, the disc has {count} tracks")]
    OutOfRange { index: usize, count: usize },

    #[error("No track covers FAD {0}")]
    NotFound(u32),

    #[error("The disc has no data track at position {0}")]
    NoDataTrack(u8),
}

pub type DiscResult<T> = Result<T, DiscError>;
