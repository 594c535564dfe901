//! Install CMake binary distributions.
//!
//! An [`Installer`] resolves the release URL for a [`Platform`], hands it to
//! a [`Fetch`] implementation for a local archive, extracts that archive and
//! normalizes the result so the target directory holds `bin/` at its top.
//!
//! [`Platform`]: cmake_platform::Platform

pub use error::{Error, Result};
pub use fetch::{Fetch, FixedArchive, LocalFetcher};
pub use install::{
    InstallOptions, InstallOutcome, Installer, RELEASE_BASE, download_url, extract_options,
    release_version,
};

mod error;
pub mod fetch;
pub mod install;
