//! Architecture identification.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86_32,
    X86_64,
    Arm32,
    Arm64,
}

impl Architecture {
    /// Identify an architecture from any of its common spellings.
    /// Case and punctuation are ignored, so `x86_64`, `X86-64` and `amd64`
    /// all match.
    pub fn from_name(name: &str) -> Result<Self> {
        let key: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "x8632" | "x86" | "i386" | "i486" | "i586" | "i686" | "ia32" | "x32" => Ok(Self::X86_32),
            "x8664" | "amd64" | "ia32e" | "em64t" | "x64" => Ok(Self::X86_64),
            "arm" | "arm32" | "armv7" | "armv7l" | "armhf" => Ok(Self::Arm32),
            "aarch64" | "arm64" => Ok(Self::Arm64),
            _ => Err(Error::UnknownArch(name.to_string())),
        }
    }

    /// Detect the running architecture, falling back to the compile-time
    /// target when sysinfo reports something unrecognised.
    pub fn detect() -> Result<Self> {
        let cpu_arch = sysinfo::System::cpu_arch();
        Self::from_name(cpu_arch.as_str()).or_else(|_| Self::from_name(std::env::consts::ARCH))
    }

    /// Canonical lowercase name, as displayed.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_32 => "x86_32",
            Self::X86_64 => "x86_64",
            Self::Arm32 => "arm_32",
            Self::Arm64 => "arm_64",
        }
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
