//! The (operating system, architecture) pair CMake distributions are built for.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::arch::Architecture;
use crate::os::OperatingSystem;
use crate::{Error, Result};

/// A target platform.
///
/// Detected once with [`Platform::detect`] and passed to whatever needs it;
/// tests build arbitrary platforms with [`Platform::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: OperatingSystem,
    pub arch: Architecture,
}

impl Platform {
    pub fn new(os: OperatingSystem, arch: Architecture) -> Self {
        Self { os, arch }
    }

    pub fn detect() -> Result<Self> {
        let platform = Self::new(OperatingSystem::detect()?, Architecture::detect()?);
        tracing::debug!(%platform, "detected platform");
        Ok(platform)
    }

    /// Whether extracted files can carry POSIX permission bits.
    pub fn supports_posix(&self) -> bool {
        self.os != OperatingSystem::Windows
    }

    pub fn executable_suffix(&self) -> &'static str {
        match self.os {
            OperatingSystem::Windows => ".exe",
            _ => "",
        }
    }

    /// Whether an official release archive exists for this platform. Where
    /// none does, CMake has to be found on the `PATH` instead.
    pub fn is_download_available(&self) -> bool {
        self.download_suffix().is_ok()
    }

    /// Suffix of the official release archive for this platform, as in
    /// `cmake-3.28.1-linux-x86_64.tar.gz`.
    pub fn download_suffix(&self) -> Result<&'static str> {
        use crate::arch::Architecture::*;
        use crate::os::OperatingSystem::*;

        match (self.os, self.arch) {
            (Linux, X86_64) => Ok("linux-x86_64.tar.gz"),
            (Linux, Arm64) => Ok("linux-aarch64.tar.gz"),
            (Macos, X86_64 | Arm32 | Arm64) => Ok("macos-universal.tar.gz"),
            (Windows, X86_64) => Ok("windows-x86_64.zip"),
            (Windows, Arm64) => Ok("windows-arm64.zip"),
            (FreeBsd, _) => Err(self.unsupported("no binary release; CMake must be on the PATH")),
            (Linux, Arm32) => Err(self.unsupported("CMake is expected to ship with the system")),
            _ => Err(self.unsupported("no binary release for this architecture")),
        }
    }

    /// Find `name` (plus the executable suffix) in the directories of a
    /// `PATH`-style list. Surrounding quotes on a directory are ignored.
    pub fn executable_on_path(&self, name: &str, path: &OsStr) -> Result<PathBuf> {
        let file_name = format!("{name}{}", self.executable_suffix());
        std::env::split_paths(path)
            .map(|dir| unquote(&dir).join(&file_name))
            .find(|candidate| is_executable(candidate))
            .ok_or_else(|| Error::NotOnPath {
                name: file_name.clone(),
            })
    }

    fn unsupported(&self, reason: &'static str) -> Error {
        Error::UnsupportedPlatform {
            platform: *self,
            reason,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn unquote(dir: &Path) -> PathBuf {
    let text = dir.to_string_lossy();
    let trimmed = text.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return PathBuf::from(&trimmed[1..trimmed.len() - 1]);
        }
    }
    PathBuf::from(trimmed)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
