//! Operating system identification.

use std::fmt;
use std::str::FromStr;

use sysinfo::System;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Windows,
    Linux,
    Macos,
    FreeBsd,
}

impl OperatingSystem {
    /// Identify an operating system from a name such as `Windows 11`,
    /// `Linux`, `macOS`, `Darwin` or `FreeBSD`. Matching is by
    /// case-insensitive prefix.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let os = if lower.starts_with("windows") {
            Self::Windows
        } else if lower.starts_with("linux") {
            Self::Linux
        } else if lower.starts_with("mac") || lower.starts_with("darwin") {
            Self::Macos
        } else if lower.starts_with("freebsd") {
            Self::FreeBsd
        } else {
            return Err(Error::UnknownOs(name.to_string()));
        };
        Ok(os)
    }

    /// Detect the running operating system.
    ///
    /// sysinfo reports a distribution name on Linux (`Ubuntu`, `Fedora`), so
    /// a name it cannot classify falls back to the compile-time target.
    pub fn detect() -> Result<Self> {
        if let Some(os) = System::name().and_then(|name| Self::from_name(&name).ok()) {
            return Ok(os);
        }
        Self::from_name(std::env::consts::OS)
    }
}

impl FromStr for OperatingSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::FreeBsd => "freebsd",
        })
    }
}
