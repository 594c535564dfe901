use super::copy_dir::{copy_dir_all, copy_symlink};
use crate::permissions::unlock_dir;
use crate::remove::{RemoveOptions, remove_dir_all};
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;

/// How a staged path reaches its final location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoveStrategy {
    /// Copy, then delete the source. Works across filesystems.
    #[default]
    Copy,

    /// Rename in place, falling back to [`MoveStrategy::Copy`] when source and
    /// destination are on different devices.
    Rename,
}

/// Move a file, symlink or directory tree from `from` to `to`.
///
/// `to` must not exist.
pub fn move_path(
    from: impl AsRef<Path>,
    to: impl AsRef<Path>,
    strategy: MoveStrategy,
    remove: &RemoveOptions,
) -> Result<()> {
    let from = from.as_ref();
    let to = to.as_ref();

    if strategy == MoveStrategy::Rename {
        match rename(from, to) {
            Ok(()) => return Ok(()),
            Err(e) if e.io_kind() == Some(io::ErrorKind::CrossesDevices) => {
                tracing::debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "rename crosses devices, copying instead"
                );
            }
            Err(e) => return Err(e),
        }
    }

    copy_path(from, to)?;
    remove_dir_all(from, remove)
}

/// Rename `from` to `to` on the same filesystem.
///
/// Read-only directories are unlocked for the move, the moved directory and
/// the parent it left, and get their original permissions back afterwards.
pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let from = from.as_ref();
    let to = to.as_ref();

    let parent = from.parent().filter(|p| !p.as_os_str().is_empty());
    let parent_lock = match parent {
        Some(parent) => unlock_dir(parent)?.map(|permissions| (parent, permissions)),
        None => None,
    };
    let own_lock = unlock_dir(from)?;

    let renamed = fs::rename(from, to).map_err(|e| Error::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    });

    let mut restored = Ok(());
    if let Some(permissions) = own_lock {
        let at = if renamed.is_ok() { to } else { from };
        restored = restored.and(relock(at, permissions));
    }
    if let Some((parent, permissions)) = parent_lock {
        restored = restored.and(relock(parent, permissions));
    }
    renamed.and(restored)
}

fn relock(path: &Path, permissions: fs::Permissions) -> Result<()> {
    fs::set_permissions(path, permissions).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

fn copy_path(from: &Path, to: &Path) -> Result<()> {
    let file_type = fs::symlink_metadata(from)
        .map_err(|e| Error::Read {
            path: from.to_path_buf(),
            source: e,
        })?
        .file_type();

    if file_type.is_dir() {
        copy_dir_all(from, to)
    } else if file_type.is_symlink() {
        copy_symlink(from, to)
    } else {
        fs::copy(from, to).map(drop).map_err(|e| Error::Write {
            path: to.to_path_buf(),
            source: e,
        })
    }
}
