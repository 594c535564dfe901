use crate::permissions::PermissionMode;
use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Open `path` for writing (create + truncate), giving a new file `mode` as
/// it is created so it never exists with default permissions.
///
/// The mode is set again once the file is open: creation masks it with the
/// umask and an existing file keeps its old mode.
pub fn create_file(path: impl AsRef<Path>, mode: PermissionMode) -> Result<File> {
    let path = path.as_ref();

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    mode.apply_to_open_options(&mut options);

    let file = options.open(path).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    mode.apply_to_path(path)?;
    Ok(file)
}
