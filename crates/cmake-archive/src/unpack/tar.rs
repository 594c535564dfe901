use std::io::Read;
use std::path::{Path, PathBuf};

use tar::EntryType;

use crate::entry::{ArchiveEntry, EntryKind};
use crate::unpack::EntrySource;
use crate::{Error, Result};

pub struct TarSource<R: Read> {
    archive: tar::Archive<R>,
    path: PathBuf,
}

impl<R: Read> TarSource<R> {
    pub fn new(reader: R, path: impl AsRef<Path>) -> Self {
        Self {
            archive: tar::Archive::new(reader),
            path: path.as_ref().to_path_buf(),
        }
    }
}

fn entry_kind<R: Read>(entry: &tar::Entry<'_, R>) -> EntryKind {
    let entry_type = entry.header().entry_type();
    match entry_type {
        t if t.is_file() || t.is_contiguous() => EntryKind::File,
        t if t.is_dir() => EntryKind::Directory,
        t if t.is_symlink() => EntryKind::Symlink {
            target: entry.link_name().ok().flatten().map(|t| t.into_owned()),
        },
        t if t.is_hard_link() => EntryKind::Unsupported { kind: "hard link" },
        t if t.is_character_special() => EntryKind::Unsupported {
            kind: "character device",
        },
        t if t.is_block_special() => EntryKind::Unsupported {
            kind: "block device",
        },
        t if t.is_fifo() => EntryKind::Unsupported { kind: "fifo" },
        _ => EntryKind::Unsupported { kind: "unknown" },
    }
}

impl<R: Read> EntrySource for TarSource<R> {
    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        let path = &self.path;
        let entries = self
            .archive
            .entries()
            .map_err(|e| Error::from_io(path, e))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| Error::from_io(path, e))?;
            if entry.header().entry_type() == EntryType::XGlobalHeader {
                continue;
            }

            let name = String::from_utf8(entry.path_bytes().into_owned()).map_err(|e| {
                Error::Corrupted {
                    path: path.clone(),
                    reason: format!(
                        "entry name '{}' is not valid UTF-8",
                        String::from_utf8_lossy(e.as_bytes())
                    ),
                }
            })?;
            let kind = entry_kind(&entry);
            let size = entry.size();
            let mode = entry.header().mode().ok();

            visit(ArchiveEntry {
                name,
                kind,
                size,
                mode,
                reader: &mut entry,
            })?;
        }
        Ok(())
    }
}
