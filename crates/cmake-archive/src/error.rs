use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format: '{path}'")]
    UnsupportedFormat { path: PathBuf },

    #[error("archive entry '{entry}' escapes the destination: resolves to '{resolved}'")]
    PathTraversal { entry: String, resolved: PathBuf },

    #[error("no directory containing 'bin' found under '{root}'")]
    CanonicalRootNotFound { root: PathBuf },

    #[error("archive '{path}' is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("I/O failure on '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("interrupted while copying to '{path}'")]
    Interrupted { path: PathBuf },

    #[error(transparent)]
    Fs(#[from] cmake_fs::Error),
}

/// Coarse classification of an [`Error`], stable across variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedFormat,
    PathTraversal,
    CanonicalRootNotFound,
    Io,
    Interrupted,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::PathTraversal { .. } => ErrorKind::PathTraversal,
            Self::CanonicalRootNotFound { .. } => ErrorKind::CanonicalRootNotFound,
            Self::Interrupted { .. } => ErrorKind::Interrupted,
            Self::Io { source, .. } if source.kind() == io::ErrorKind::Interrupted => {
                ErrorKind::Interrupted
            }
            Self::Fs(e) if e.io_kind() == Some(io::ErrorKind::Interrupted) => {
                ErrorKind::Interrupted
            }
            Self::Corrupted { .. } | Self::Io { .. } | Self::Fs(_) => ErrorKind::Io,
        }
    }

    /// Wrap an I/O error, keeping interruption distinguishable.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::Interrupted {
            Self::Interrupted { path }
        } else {
            Self::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
