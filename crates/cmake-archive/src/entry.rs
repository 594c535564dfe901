use std::io::{self, Read};
use std::path::PathBuf;

/// What an archive entry materialises as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink { target: Option<PathBuf> },
    /// Hard links, devices, FIFOs and anything else without a portable form.
    Unsupported { kind: &'static str },
}

impl EntryKind {
    /// Only regular files and directories are written to disk.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::File | Self::Directory)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink { .. } => "symbolic link",
            Self::Unsupported { kind } => *kind,
        }
    }
}

/// One entry of an open archive, borrowed for the duration of a visit.
///
/// The payload must be read to the end or [`skip`](ArchiveEntry::skip)ped
/// before the source moves on.
pub struct ArchiveEntry<'a> {
    /// Raw name as stored in the archive. Untrusted.
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    /// Raw mode bits, when the archive recorded them.
    pub mode: Option<u32>,
    pub reader: &'a mut dyn Read,
}

impl ArchiveEntry<'_> {
    /// Drain the remaining payload.
    pub fn skip(&mut self) -> io::Result<u64> {
        io::copy(&mut *self.reader, &mut io::sink())
    }
}

impl Read for ArchiveEntry<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub kind: &'static str,
}

/// Summary of an extraction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnpackReport {
    pub files: usize,
    pub directories: usize,
    pub skipped: Vec<SkippedEntry>,
    pub total_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_drains_payload() {
        let mut data: &[u8] = b"payload";
        let mut entry = ArchiveEntry {
            name: "lib/libfoo.so".into(),
            kind: EntryKind::Symlink { target: None },
            size: 7,
            mode: Some(0o777),
            reader: &mut data,
        };
        assert_eq!(entry.skip().unwrap(), 7);
        let mut rest = Vec::new();
        entry.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn supported_kinds() {
        assert!(EntryKind::File.is_supported());
        assert!(EntryKind::Directory.is_supported());
        assert!(!EntryKind::Symlink { target: None }.is_supported());
        assert_eq!(EntryKind::Unsupported { kind: "fifo" }.describe(), "fifo");
    }
}
