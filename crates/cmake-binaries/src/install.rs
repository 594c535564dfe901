//! Fetch, extract and normalize one CMake release into a target directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cmake_archive::{ExtractOptions, extract, normalize_with};
use cmake_fs::{RemoveOptions, remove_dir_all};
use cmake_platform::Platform;

use crate::fetch::Fetch;
use crate::{Error, Result};

pub const RELEASE_BASE: &str = "https://github.com/Kitware/CMake/releases/download";

/// The CMake release a version string refers to, without any trailing build
/// qualifier: `3.28.1-b2` becomes `3.28.1`.
pub fn release_version(version: &str) -> Result<&str> {
    let release = version.split_once('-').map_or(version, |(release, _)| release);
    let mut parts = release.split('.');
    let numeric = |part: Option<&str>| {
        part.is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    };
    if !numeric(parts.next()) || !numeric(parts.next()) {
        return Err(Error::InvalidVersion(version.to_string()));
    }
    Ok(release)
}

/// Official download URL of `version` for `platform`.
pub fn download_url(version: &str, platform: &Platform) -> Result<String> {
    let release = release_version(version)?;
    let suffix = platform.download_suffix()?;
    Ok(format!("{RELEASE_BASE}/v{release}/cmake-{release}-{suffix}"))
}

/// Extraction settings matching what `platform` can represent on disk.
pub fn extract_options(platform: &Platform) -> ExtractOptions {
    ExtractOptions::new().supports_posix(platform.supports_posix())
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub target: PathBuf,
    pub platform: Platform,
    pub extract: ExtractOptions,
    /// Directories searched for a system CMake on platforms without a
    /// release archive. Defaults to the `PATH` of the running process.
    pub search_path: Option<OsString>,
}

impl InstallOptions {
    pub fn new(target: impl AsRef<Path>, platform: Platform) -> Self {
        Self {
            target: target.as_ref().to_path_buf(),
            extract: extract_options(&platform),
            platform,
            search_path: std::env::var_os("PATH"),
        }
    }

    pub fn search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn remove_options(&self) -> &RemoveOptions {
        &self.extract.remove
    }
}

/// What [`Installer::install`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A previous install was found and left untouched.
    AlreadyInstalled { bin: PathBuf },
    Installed { bin: PathBuf, files: usize },
    /// No release exists for the platform; a system CMake is used instead.
    OnPath { cmake: PathBuf },
}

impl InstallOutcome {
    pub fn bin(&self) -> &Path {
        match self {
            Self::AlreadyInstalled { bin } | Self::Installed { bin, .. } => bin,
            Self::OnPath { cmake } => cmake.parent().unwrap_or(cmake.as_path()),
        }
    }
}

pub struct Installer<F> {
    fetcher: F,
    options: InstallOptions,
}

impl<F: Fetch> Installer<F> {
    pub fn new(fetcher: F, options: InstallOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.options.target.join("bin")
    }

    pub fn is_installed(&self) -> bool {
        self.bin_dir().is_dir()
    }

    /// Install `version` unless the target already holds an install.
    ///
    /// Platforms without a release archive must provide CMake on the search
    /// path; the target is left untouched for them. A failed install removes
    /// whatever it left in the target.
    pub fn install(&self, version: &str) -> Result<InstallOutcome> {
        let target = &self.options.target;
        let platform = &self.options.platform;
        if !platform.is_download_available() {
            let search_path = self.options.search_path.as_deref().unwrap_or_default();
            let cmake = platform.executable_on_path("cmake", search_path)?;
            tracing::info!(%platform, cmake = %cmake.display(), "using CMake from the PATH");
            return Ok(InstallOutcome::OnPath { cmake });
        }

        if self.is_installed() {
            tracing::info!(target = %target.display(), "CMake already installed");
            return Ok(InstallOutcome::AlreadyInstalled {
                bin: self.bin_dir(),
            });
        }

        let url = download_url(version, &self.options.platform)?;
        tracing::info!(%url, target = %target.display(), "installing CMake");

        match self.try_install(&url) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if let Err(cleanup) = remove_dir_all(target, self.options.remove_options()) {
                    tracing::warn!(
                        target = %target.display(),
                        error = %cleanup,
                        "failed to clean up after install error"
                    );
                }
                Err(e)
            }
        }
    }

    fn try_install(&self, url: &str) -> Result<InstallOutcome> {
        let target = &self.options.target;
        let archive = self.fetcher.fetch(url)?;

        remove_dir_all(target, self.options.remove_options())?;
        let report = extract(&archive, target, &self.options.extract)?;
        let bin = normalize_with(target, self.options.remove_options())?;

        tracing::info!(bin = %bin.display(), files = report.files, "CMake installed");
        Ok(InstallOutcome::Installed {
            bin,
            files: report.files,
        })
    }
}
