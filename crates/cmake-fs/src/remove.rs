//! Race-tolerant recursive removal.
//!
//! Windows releases file handles lazily, so removing a directory right after
//! its last file can fail with "directory not empty". Those failures are
//! retried with exponential backoff. Entries that disappear between listing
//! and deletion are ignored; the window between the two is not closed.

use crate::permissions::unlock_dir;
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoveOptions {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoveOptions {
    pub fn new() -> Self {
        Self {
            max_attempts: 30,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `retry` (0-indexed): `base * 2^retry`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = 2_u32.saturating_pow(retry);
        self.base_delay.saturating_mul(multiplier).min(self.max_delay)
    }
}

/// How much retrying a successful removal needed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryOutcome {
    pub retries: u32,
    pub waited: Duration,
}

fn is_transient(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::DirectoryNotEmpty
}

/// Run a removal operation, retrying "directory not empty" failures.
///
/// `NotFound` counts as success. Any other error is returned immediately.
pub fn retry_remove<F>(path: &Path, options: &RemoveOptions, mut op: F) -> Result<RetryOutcome>
where
    F: FnMut() -> io::Result<()>,
{
    let max_attempts = options.max_attempts.max(1);
    let mut outcome = RetryOutcome::default();

    let mut attempt = 0;

    loop {
        attempt += 1;
        match op() {
            Ok(()) => return Ok(outcome),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(outcome),
            Err(e) if is_transient(&e) && attempt < max_attempts => {
                let delay = options.delay_for(outcome.retries);
                tracing::warn!(
                    path = %path.display(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "directory not empty, retrying removal"
                );
                thread::sleep(delay);
                outcome.retries += 1;
                outcome.waited += delay;
            }
            Err(e) if is_transient(&e) => {
                return Err(Error::RetryLimitExceeded {
                    path: path.to_path_buf(),
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                return Err(Error::Remove {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        }
    }
}

/// Remove `path` and everything below it. A missing path is not an error.
///
/// Files go first, then directories bottom-up. Symbolic links are removed,
/// never followed.
pub fn remove_dir_all(path: impl AsRef<Path>, options: &RemoveOptions) -> Result<()> {
    let path = path.as_ref();
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if metadata.is_dir() {
        remove_tree(path, options)
    } else {
        remove_file(path)
    }
}

fn remove_tree(dir: &Path, options: &RemoveOptions) -> Result<()> {
    // Failing to unlock is not fatal here; removing the children reports
    // the real error.
    if let Err(e) = unlock_dir(dir) {
        tracing::debug!(path = %dir.display(), error = %e, "could not unlock directory");
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::Read {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| Error::Read {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(Error::Read { path, source: e }),
        };

        if file_type.is_dir() {
            remove_tree(&path, options)?;
        } else {
            remove_file(&path)?;
        }
    }

    retry_remove(dir, options, || fs::remove_dir(dir))?;
    Ok(())
}

fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Remove {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
