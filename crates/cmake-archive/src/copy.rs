use std::io::{Read, Write};
use std::path::Path;

use crate::{Error, Result};

pub(crate) const BUFFER_SIZE: usize = 10 * 1024;

/// Stream `reader` into `writer` through a fixed buffer.
///
/// `path` names the destination in errors. An interrupted read or write is
/// reported as [`Error::Interrupted`], never retried.
pub(crate) fn copy_stream<R, W>(reader: &mut R, writer: &mut W, path: &Path) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = [0u8; BUFFER_SIZE];
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buffer).map_err(|e| Error::from_io(path, e))?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n]).map_err(|e| Error::from_io(path, e))?;
        written += n as u64;
    }
    writer.flush().map_err(|e| Error::from_io(path, e))?;
    Ok(written)
}
