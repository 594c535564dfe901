use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn read_err(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Read {
        path: path.to_path_buf(),
        source,
    }
}

fn write_err(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Copy the tree at `src` into `dest`, creating `dest` if needed.
///
/// Files keep their permissions. Directory permissions are restored after
/// the whole tree is populated, deepest first, so a read-only directory can
/// still receive its children.
pub fn copy_dir_all(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let mut pending = vec![(src.as_ref().to_path_buf(), dest.as_ref().to_path_buf())];
    let mut directories: Vec<(PathBuf, fs::Permissions)> = Vec::new();

    while let Some((from, to)) = pending.pop() {
        fs::create_dir_all(&to).map_err(write_err(&to))?;
        let permissions = fs::metadata(&from).map_err(read_err(&from))?.permissions();
        directories.push((to.clone(), permissions));

        for entry in fs::read_dir(&from).map_err(read_err(&from))? {
            let entry = entry.map_err(read_err(&from))?;
            let source = entry.path();
            let target = to.join(entry.file_name());
            let file_type = entry.file_type().map_err(read_err(&source))?;

            if file_type.is_symlink() {
                copy_symlink(&source, &target)?;
            } else if file_type.is_dir() {
                pending.push((source, target));
            } else {
                fs::copy(&source, &target).map_err(write_err(&target))?;
            }
        }
    }

    for (dir, permissions) in directories.into_iter().rev() {
        fs::set_permissions(&dir, permissions).map_err(write_err(&dir))?;
    }
    Ok(())
}

/// Recreate the link at `src` as `dest`, pointing at the same target.
#[cfg(unix)]
pub(crate) fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src).map_err(read_err(src))?;
    std::os::unix::fs::symlink(target, dest).map_err(write_err(dest))
}

#[cfg(not(unix))]
pub(crate) fn copy_symlink(src: &Path, _dest: &Path) -> Result<()> {
    tracing::warn!(link = %src.display(), "symbolic links are not copied on this platform");
    Ok(())
}
