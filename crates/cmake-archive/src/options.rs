use std::path::{Path, PathBuf};

use cmake_fs::RemoveOptions;

/// Knobs for [`extract`](crate::extract()) and [`unpack`](crate::unpack()).
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Restore permission bits recorded in the archive. Off on platforms
    /// without POSIX permissions.
    pub supports_posix: bool,
    /// Where staging directories are created. `None` uses the system
    /// temporary directory and promotes by copying; a directory on the
    /// target's filesystem lets promotion rename instead.
    pub staging_dir: Option<PathBuf>,
    pub remove: RemoveOptions,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            supports_posix: cfg!(unix),
            staging_dir: None,
            remove: RemoveOptions::default(),
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supports_posix(mut self, supports_posix: bool) -> Self {
        self.supports_posix = supports_posix;
        self
    }

    pub fn staging_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.staging_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn remove_options(mut self, remove: RemoveOptions) -> Self {
        self.remove = remove;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let options = ExtractOptions::new()
            .supports_posix(false)
            .staging_dir("/var/tmp/stage")
            .remove_options(RemoveOptions::new().max_attempts(3));
        assert!(!options.supports_posix);
        assert_eq!(options.staging_dir.as_deref(), Some(Path::new("/var/tmp/stage")));
        assert_eq!(options.remove.max_attempts, 3);
    }

    #[test]
    fn posix_defaults_to_platform() {
        assert_eq!(ExtractOptions::default().supports_posix, cfg!(unix));
    }
}
