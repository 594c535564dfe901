use crate::primitives::{MoveStrategy, move_path};
use crate::remove::{RemoveOptions, remove_dir_all};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PREFIX: &str = ".cmake-staging-";

/// A private staging directory whose contents are promoted into a destination
/// on [`Workspace::commit`].
///
/// Dropping an uncommitted workspace deletes the staging directory with the
/// retrying remover, whatever state the extraction left it in.
pub struct Workspace {
    dir: TempDir,
    destination: PathBuf,
    strategy: MoveStrategy,
    remove: RemoveOptions,
}

impl Workspace {
    /// Stage in the system temporary directory. Promotion copies, since the
    /// temporary directory may be on another device.
    pub fn new(destination: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir()
            .map_err(|e| Error::Write {
                path: std::env::temp_dir(),
                source: e,
            })?;
        Ok(Self::from_dir(dir, destination.as_ref(), MoveStrategy::Copy))
    }

    /// Stage inside `parent`, promoting by rename when possible.
    pub fn new_in(parent: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Self> {
        let parent = parent.as_ref();
        fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(parent)
            .map_err(|e| Error::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        Ok(Self::from_dir(dir, destination.as_ref(), MoveStrategy::Rename))
    }

    fn from_dir(dir: TempDir, destination: &Path, strategy: MoveStrategy) -> Self {
        tracing::debug!(staging = %dir.path().display(), "created staging area");
        Self {
            dir,
            destination: destination.to_path_buf(),
            strategy,
            remove: RemoveOptions::default(),
        }
    }

    pub fn remove_options(mut self, remove: RemoveOptions) -> Self {
        self.remove = remove;
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn strategy(&self) -> MoveStrategy {
        self.strategy
    }

    /// Move every top-level entry of the staging area into the destination,
    /// replacing entries of the same name. The destination is created if
    /// missing; unrelated entries already there are kept.
    pub fn commit(self) -> Result<()> {
        fs::create_dir_all(&self.destination).map_err(|e| Error::Write {
            path: self.destination.clone(),
            source: e,
        })?;

        let entries = fs::read_dir(self.path()).map_err(|e| Error::Read {
            path: self.path().to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::Read {
                path: self.path().to_path_buf(),
                source: e,
            })?;
            let target = self.destination.join(entry.file_name());
            remove_dir_all(&target, &self.remove)?;
            move_path(entry.path(), &target, self.strategy, &self.remove)?;
        }

        tracing::debug!(
            destination = %self.destination.display(),
            "promoted staging area"
        );
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = remove_dir_all(self.dir.path(), &self.remove) {
            tracing::warn!(
                staging = %self.dir.path().display(),
                error = %e,
                "failed to clean up staging area"
            );
        }
    }
}
