use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid CMake version '{0}'")]
    InvalidVersion(String),

    #[error("unsupported URL scheme '{scheme}' in '{url}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("archive for '{url}' not found at '{path}'")]
    NotFound { url: String, path: PathBuf },

    #[error(transparent)]
    Archive(#[from] cmake_archive::Error),

    #[error(transparent)]
    Fs(#[from] cmake_fs::Error),

    #[error(transparent)]
    Platform(#[from] cmake_platform::Error),
}
