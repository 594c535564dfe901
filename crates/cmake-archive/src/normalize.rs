//! Collapse an extracted tree onto its canonical root.
//!
//! Release archives nest their payload under one or more wrapper
//! directories (`cmake-3.28.1-linux-x86_64/bin/cmake`). The canonical root
//! is the directory whose direct child is `bin`; normalizing hoists its
//! contents to the top and discards everything else.

use std::fs;
use std::path::{Path, PathBuf};

use cmake_fs::{RemoveOptions, remove_dir_all};

use crate::{Error, Result};

const BIN: &str = "bin";
const SHELL_PREFIX: &str = ".cmake-normalize-";

/// Normalize `root` so that `root/bin` is the canonical `bin` directory.
/// Returns the path of `root/bin`.
pub fn normalize(root: impl AsRef<Path>) -> Result<PathBuf> {
    normalize_with(root, &RemoveOptions::default())
}

pub fn normalize_with(root: impl AsRef<Path>, remove: &RemoveOptions) -> Result<PathBuf> {
    let root = root.as_ref();
    let canonical = find_canonical_root(root)?.ok_or_else(|| Error::CanonicalRootNotFound {
        root: root.to_path_buf(),
    })?;

    if canonical == root {
        tracing::debug!(root = %root.display(), "already normalized");
        return Ok(root.join(BIN));
    }
    tracing::debug!(
        root = %root.display(),
        canonical = %canonical.display(),
        "located canonical root"
    );

    // Detach the canonical root under a name that cannot collide with
    // anything being hoisted, so that discarding the rest of `root` cannot
    // touch it.
    let shell = shell_path(root, &canonical)?;
    cmake_fs::rename(&canonical, &shell)?;

    for path in list(root)? {
        if path != shell {
            remove_dir_all(&path, remove)?;
        }
    }

    for path in list(&shell)? {
        if let Some(name) = path.file_name() {
            let hoisted = root.join(name);
            cmake_fs::rename(&path, &hoisted)?;
            tracing::debug!(path = %hoisted.display(), "hoisted");
        }
    }
    remove_dir_all(&shell, remove)?;

    Ok(root.join(BIN))
}

/// Find the directory under `root` that has a direct child directory named
/// `bin`.
///
/// Each directory's children are checked before any of them is descended
/// into, and children are visited in file-name order, so `root` itself wins
/// whenever it has a `bin`. Symbolic links are not followed.
pub fn find_canonical_root(root: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let root = root.as_ref();
    let children = subdirectories(root)?;
    if children
        .iter()
        .any(|child| child.file_name().is_some_and(|name| name == BIN))
    {
        return Ok(Some(root.to_path_buf()));
    }
    for child in children {
        if let Some(found) = find_canonical_root(&child)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::from_io(dir, e))? {
        let entry = entry.map_err(|e| Error::from_io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::from_io(&entry.path(), e))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn list(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::from_io(dir, e))? {
        paths.push(entry.map_err(|e| Error::from_io(dir, e))?.path());
    }
    paths.sort();
    Ok(paths)
}

fn shell_path(root: &Path, canonical: &Path) -> Result<PathBuf> {
    let taken = list(canonical)?;
    let mut n = 0u32;
    loop {
        let name = format!("{SHELL_PREFIX}{n}");
        let collides = root.join(&name).exists()
            || taken
                .iter()
                .any(|p| p.file_name().is_some_and(|child| child == name.as_str()));
        if !collides {
            return Ok(root.join(name));
        }
        n += 1;
    }
}
