use std::fmt;
use std::io::{self, Read};
use std::path::Path;

use crate::{Error, Result};

/// Archive container that holds a tree of entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerFormat {
    Zip,
    Tar,
}

/// Single-stream compression wrapped around a container or a plain file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Xz,
    Zstd,
}

impl Compression {
    /// Whether support for this codec was compiled in.
    pub fn is_enabled(self) -> bool {
        match self {
            Self::Gzip => true,
            Self::Xz => cfg!(feature = "xz"),
            Self::Zstd => cfg!(feature = "zstd"),
        }
    }

    /// Wrap `reader` in a streaming decoder for this codec.
    pub fn decoder<R: Read>(self, reader: R) -> io::Result<Decoder<R>> {
        match self {
            Self::Gzip => Ok(Decoder::Gzip(Box::new(flate2::read::GzDecoder::new(
                reader,
            )))),
            #[cfg(feature = "xz")]
            Self::Xz => Ok(Decoder::Xz(Box::new(xz2::read::XzDecoder::new(reader)))),
            #[cfg(feature = "zstd")]
            Self::Zstd => Ok(Decoder::Zstd(Box::new(zstd::stream::read::Decoder::new(
                reader,
            )?))),
            #[allow(unreachable_patterns)]
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{self:?} support is not compiled in"),
            )),
        }
    }
}

pub enum Decoder<R: Read> {
    Gzip(Box<flate2::read::GzDecoder<R>>),
    #[cfg(feature = "xz")]
    Xz(Box<xz2::read::XzDecoder<R>>),
    #[cfg(feature = "zstd")]
    Zstd(Box<zstd::stream::read::Decoder<'static, io::BufReader<R>>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Gzip(d) => d.read(buf),
            #[cfg(feature = "xz")]
            Self::Xz(d) => d.read(buf),
            #[cfg(feature = "zstd")]
            Self::Zstd(d) => d.read(buf),
        }
    }
}

/// A recognised filename suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extension {
    Zip,
    /// Java archive, read as zip.
    Jar,
    Tar,
    Gz,
    /// Gzip over tar.
    Tgz,
    Xz,
    Zst,
}

impl Extension {
    /// Match a suffix including its leading dot, ignoring ASCII case.
    /// Codecs that were not compiled in are not recognised.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let ext = match suffix.to_ascii_lowercase().as_str() {
            ".zip" => Self::Zip,
            ".jar" => Self::Jar,
            ".tar" => Self::Tar,
            ".gz" => Self::Gz,
            ".tgz" => Self::Tgz,
            ".xz" => Self::Xz,
            ".zst" => Self::Zst,
            _ => return None,
        };
        match ext.compression() {
            Some(codec) if !codec.is_enabled() => None,
            _ => Some(ext),
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::Jar => ".jar",
            Self::Tar => ".tar",
            Self::Gz => ".gz",
            Self::Tgz => ".tgz",
            Self::Xz => ".xz",
            Self::Zst => ".zst",
        }
    }

    pub fn container(self) -> Option<ContainerFormat> {
        match self {
            Self::Zip | Self::Jar => Some(ContainerFormat::Zip),
            Self::Tar => Some(ContainerFormat::Tar),
            _ => None,
        }
    }

    pub fn compression(self) -> Option<Compression> {
        match self {
            Self::Gz | Self::Tgz => Some(Compression::Gzip),
            Self::Xz => Some(Compression::Xz),
            Self::Zst => Some(Compression::Zstd),
            _ => None,
        }
    }

    /// File name left once this layer is decompressed from `name`.
    ///
    /// Returns `None` when `name` does not end with this suffix or this is a
    /// container extension.
    pub fn strip_from(self, name: &str) -> Option<String> {
        self.compression()?;
        let split = name.len().checked_sub(self.suffix().len())?;
        if !name.is_char_boundary(split) || !name[split..].eq_ignore_ascii_case(self.suffix()) {
            return None;
        }
        let stem = &name[..split];
        Some(match self {
            Self::Tgz => format!("{stem}.tar"),
            _ => stem.to_string(),
        })
    }
}

/// Archive suffixes of a file name, outermost first.
///
/// `cmake-3.10-Linux-x86_64.tar.gz` parses to `[.gz, .tar]`. Parsing walks
/// the name right to left, stops at the first unrecognised suffix so version
/// numbers are left alone, and stops after the first container suffix since
/// anything beneath a container is the container's own business.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionChain {
    extensions: Vec<Extension>,
}

impl ExtensionChain {
    /// Parse the chain of `path`'s file name.
    ///
    /// A name with no recognised outermost suffix is [`Error::UnsupportedFormat`].
    pub fn parse(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::try_parse(path).ok_or_else(|| Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    pub fn try_parse(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_string_lossy();
        let mut rest: &str = &name;
        let mut extensions = Vec::new();

        // A leading dot marks a hidden file, not an extension.
        while let Some(dot) = rest.rfind('.').filter(|&dot| dot > 0) {
            let Some(ext) = Extension::from_suffix(&rest[dot..]) else {
                break;
            };
            extensions.push(ext);
            rest = &rest[..dot];
            if ext.container().is_some() {
                break;
            }
        }

        if extensions.is_empty() {
            None
        } else {
            Some(Self { extensions })
        }
    }

    pub fn outermost(&self) -> Extension {
        self.extensions[0]
    }

    /// Container at the bottom of the chain, if the name promises one.
    pub fn container(&self) -> Option<ContainerFormat> {
        self.extensions.iter().rev().find_map(|ext| match ext {
            Extension::Tgz => Some(ContainerFormat::Tar),
            ext => ext.container(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Extension> + '_ {
        self.extensions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Display for ExtensionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ext in self.extensions.iter().rev() {
            f.write_str(ext.suffix())?;
        }
        Ok(())
    }
}
