use std::fs;
use std::path::Path;

use cmake_fs::{MoveStrategy, RemoveOptions, Workspace, move_path, remove_dir_all};
use tempfile::TempDir;

use crate::decompress::decompress;
use crate::entry::UnpackReport;
use crate::format::{Extension, ExtensionChain};
use crate::options::ExtractOptions;
use crate::unpack::unpack_as;
use crate::{Error, Result};

/// Extract the archive at `source` into `target`, peeling compression layers
/// as its extension chain dictates.
///
/// Everything is staged first and promoted into `target` only once the whole
/// chain has been unpacked, so a failure never leaves a half-written target
/// behind. `target` is created if missing; existing entries that the archive
/// also provides are replaced.
pub fn extract(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<UnpackReport> {
    let source = source.as_ref();
    let target = target.as_ref();

    let chain = ExtensionChain::parse(source)?;
    tracing::debug!(source = %source.display(), chain = %chain, "extracting archive");

    fs::create_dir_all(target).map_err(|e| Error::from_io(target, e))?;
    let workspace = match &options.staging_dir {
        Some(dir) => Workspace::new_in(dir, target)?,
        None => Workspace::new(target)?,
    }
    .remove_options(options.remove);

    let report = extract_into(source, &chain, workspace.path(), options)?;
    workspace.commit()?;

    tracing::debug!(
        target = %target.display(),
        files = report.files,
        directories = report.directories,
        "extraction complete"
    );
    Ok(report)
}

fn extract_into(
    source: &Path,
    chain: &ExtensionChain,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<UnpackReport> {
    let outermost = chain.outermost();
    if let Some(format) = outermost.container() {
        return unpack_as(source, format, destination, options);
    }

    let scratch = scratch_dir(options)?;
    let result = peel_layer(source, outermost, scratch.path(), destination, options);
    discard(scratch, &options.remove);
    result
}

fn peel_layer(
    source: &Path,
    layer: Extension,
    scratch: &Path,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<UnpackReport> {
    let decompressed = decompress(source, scratch)?;
    tracing::debug!(layer = layer.suffix(), output = %decompressed.display(), "peeled layer");

    if let Some(inner) = ExtensionChain::try_parse(&decompressed) {
        return extract_into(&decompressed, &inner, destination, options);
    }

    // No further archive suffix: the decompressed file is the payload.
    let Some(name) = decompressed.file_name() else {
        return Err(Error::UnsupportedFormat {
            path: source.to_path_buf(),
        });
    };
    let placed = destination.join(name);
    let bytes = fs::metadata(&decompressed)
        .map_err(|e| Error::from_io(&decompressed, e))?
        .len();
    move_path(&decompressed, &placed, MoveStrategy::Rename, &options.remove)?;

    Ok(UnpackReport {
        files: 1,
        total_bytes: bytes,
        ..UnpackReport::default()
    })
}

fn scratch_dir(options: &ExtractOptions) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".cmake-layer-");
    let scratch = match &options.staging_dir {
        Some(dir) => builder.tempdir_in(dir),
        None => builder.tempdir(),
    };
    scratch.map_err(|e| {
        let parent = options
            .staging_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        Error::from_io(&parent, e)
    })
}

fn discard(scratch: TempDir, remove: &RemoveOptions) {
    if let Err(e) = remove_dir_all(scratch.path(), remove) {
        tracing::warn!(
            scratch = %scratch.path().display(),
            error = %e,
            "failed to remove scratch directory"
        );
    }
}
