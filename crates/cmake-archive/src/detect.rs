use std::io::{self, Read, Seek};

use crate::format::ContainerFormat;

/// Identify a container from its leading bytes, zip first, then tar.
///
/// Tar detection needs the whole 512-byte header block.
pub fn detect_format(data: &[u8]) -> Option<ContainerFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ContainerFormat::Zip),
        _ if is_tar_header(data) => Some(ContainerFormat::Tar),
        _ => None,
    }
}

// POSIX writes "ustar\0", GNU writes "ustar ".
fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= 512 && data[257..262] == *b"ustar"
}

pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ContainerFormat>> {
    let mut header = Vec::with_capacity(512);
    reader.by_ref().take(512).read_to_end(&mut header)?;
    reader.rewind()?;
    Ok(detect_format(&header))
}
