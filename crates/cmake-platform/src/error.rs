use thiserror::Error;

use crate::Platform;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown architecture: {0}")]
    UnknownArch(String),

    #[error("unknown operating system: {0}")]
    UnknownOs(String),

    #[error("unsupported platform {platform}: {reason}")]
    UnsupportedPlatform {
        platform: Platform,
        reason: &'static str,
    },

    #[error("{name} not found on PATH")]
    NotOnPath { name: String },
}
