//! Container unpacking: walk the entries of a zip or tar archive and write
//! files and directories below a destination.

mod tar;
mod zip;

pub use self::tar::TarSource;
pub use self::zip::ZipSource;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cmake_fs::PermissionMode;

use crate::copy::copy_stream;
use crate::detect::detect_from_reader;
use crate::entry::{ArchiveEntry, EntryKind, SkippedEntry, UnpackReport};
use crate::format::{ContainerFormat, ExtensionChain};
use crate::options::ExtractOptions;
use crate::sanitize::sanitize_entry_name;
use crate::{Error, Result};

/// An open archive whose entries can be visited in stored order.
pub trait EntrySource {
    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()>;
}

/// Unpack the container at `source` into `destination`.
///
/// The container is chosen by extension (`.zip`, `.jar`, `.tar`). Anything
/// else is sniffed from its leading bytes, zip before tar.
pub fn unpack(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<UnpackReport> {
    let source = source.as_ref();
    let format = match ExtensionChain::try_parse(source).and_then(|c| c.outermost().container()) {
        Some(format) => format,
        None => sniff(source)?,
    };
    unpack_as(source, format, destination.as_ref(), options)
}

fn sniff(source: &Path) -> Result<ContainerFormat> {
    let mut file = File::open(source).map_err(|e| Error::from_io(source, e))?;
    detect_from_reader(&mut file)
        .map_err(|e| Error::from_io(source, e))?
        .ok_or_else(|| Error::UnsupportedFormat {
            path: source.to_path_buf(),
        })
}

pub(crate) fn unpack_as(
    source: &Path,
    format: ContainerFormat,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<UnpackReport> {
    let file = File::open(source).map_err(|e| Error::from_io(source, e))?;
    let reader = BufReader::new(file);
    let mut entries: Box<dyn EntrySource> = match format {
        ContainerFormat::Zip => Box::new(ZipSource::new(reader, source)?),
        ContainerFormat::Tar => Box::new(TarSource::new(reader, source)),
    };

    let report = unpack_entries(entries.as_mut(), destination, options)?;
    tracing::debug!(
        source = %source.display(),
        format = ?format,
        files = report.files,
        directories = report.directories,
        skipped = report.skipped.len(),
        bytes = report.total_bytes,
        "unpacked archive"
    );
    Ok(report)
}

/// Write every entry of `source` below `destination`.
///
/// Directory modes are applied after all entries are written so that a
/// read-only directory does not block its own contents.
pub fn unpack_entries(
    source: &mut dyn EntrySource,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<UnpackReport> {
    fs::create_dir_all(destination).map_err(|e| Error::from_io(destination, e))?;

    let mut report = UnpackReport::default();
    let mut directory_modes: Vec<(PathBuf, PermissionMode)> = Vec::new();

    source.for_each_entry(&mut |mut entry: ArchiveEntry<'_>| -> Result<()> {
        let resolved = sanitize_entry_name(&entry.name, destination)?;

        if !entry.kind.is_supported() {
            tracing::warn!(
                entry = %entry.name,
                kind = entry.kind.describe(),
                "skipping unsupported archive entry"
            );
            entry.skip().map_err(|e| Error::from_io(destination, e))?;
            report.skipped.push(SkippedEntry {
                name: entry.name,
                kind: entry.kind.describe(),
            });
            return Ok(());
        }

        let Some(path) = resolved else {
            if entry.kind == EntryKind::File {
                return Err(Error::Corrupted {
                    path: destination.to_path_buf(),
                    reason: format!("file entry '{}' has an empty name", entry.name),
                });
            }
            return Ok(());
        };

        let mode = if options.supports_posix {
            PermissionMode::from_raw(entry.mode)
        } else {
            PermissionMode::Inherit
        };

        match entry.kind {
            EntryKind::Directory => {
                fs::create_dir_all(&path).map_err(|e| Error::from_io(&path, e))?;
                directory_modes.push((path, mode));
                report.directories += 1;
            }
            _ => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
                }
                let mut out = cmake_fs::create_file(&path, mode)?;
                report.total_bytes += copy_stream(&mut entry, &mut out, &path)?;
                report.files += 1;
            }
        }
        Ok(())
    })?;

    for (path, mode) in directory_modes.into_iter().rev() {
        mode.apply_to_path(&path)?;
    }
    Ok(report)
}
