use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use crate::entry::{ArchiveEntry, EntryKind};
use crate::unpack::EntrySource;
use crate::{Error, Result};

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    path: PathBuf,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let archive = zip::ZipArchive::new(reader).map_err(|e| Error::Corrupted {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { archive, path })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index).map_err(|e| Error::Corrupted {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

            let name = file.name().to_string();
            let mode = file.unix_mode();
            let size = file.size();
            let kind = if file.is_dir() {
                EntryKind::Directory
            } else if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
                EntryKind::Symlink { target: None }
            } else {
                EntryKind::File
            };

            visit(ArchiveEntry {
                name,
                kind,
                size,
                mode,
                reader: &mut file,
            })?;
        }
        Ok(())
    }
}
