use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::copy::copy_stream;
use crate::format::ExtensionChain;
use crate::{Error, Result};

/// Strip the outermost compression layer of `source` into `staging_dir`.
///
/// The output is named after `source` minus the compression suffix
/// (`.tgz` becomes `.tar`) and streamed through a fixed buffer.
pub fn decompress(source: impl AsRef<Path>, staging_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let source = source.as_ref();
    let staging_dir = staging_dir.as_ref();

    let unsupported = || Error::UnsupportedFormat {
        path: source.to_path_buf(),
    };
    let ext = ExtensionChain::parse(source)?.outermost();
    let codec = ext.compression().ok_or_else(unsupported)?;
    if !codec.is_enabled() {
        return Err(unsupported());
    }
    let name = source.file_name().ok_or_else(unsupported)?.to_string_lossy();
    let stripped = ext.strip_from(&name).ok_or_else(unsupported)?;
    let output = staging_dir.join(stripped);

    let input = File::open(source).map_err(|e| Error::from_io(source, e))?;
    let mut decoder = codec
        .decoder(BufReader::new(input))
        .map_err(|e| Error::from_io(source, e))?;
    let mut out = File::create(&output).map_err(|e| Error::from_io(&output, e))?;
    let written = copy_stream(&mut decoder, &mut out, &output)?;

    tracing::debug!(
        source = %source.display(),
        output = %output.display(),
        codec = ?codec,
        bytes = written,
        "decompressed layer"
    );
    Ok(output)
}
