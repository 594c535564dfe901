use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to remove '{path}': {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("failed to move '{from}' to '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("gave up removing '{path}' after {attempts} attempts: {source}")]
    RetryLimitExceeded {
        path: PathBuf,
        attempts: u32,
        source: io::Error,
    },

    #[error("invalid permission string '{0}'")]
    InvalidPermissions(String),
}

impl Error {
    /// The underlying I/O error kind, if this error wraps one.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Remove { source, .. }
            | Self::Move { source, .. }
            | Self::RetryLimitExceeded { source, .. } => Some(source.kind()),
            Self::InvalidPermissions(_) => None,
        }
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Remove { path, .. }
            | Self::RetryLimitExceeded { path, .. } => Some(path),
            Self::Move { from, .. } => Some(from),
            Self::InvalidPermissions(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
