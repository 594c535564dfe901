use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry name against `destination`.
///
/// Names are split on both `/` and `\`. Empty and `.` components are dropped
/// and `..` pops the previous component. A name that is absolute, carries a
/// drive prefix, contains a NUL byte or climbs above `destination` is
/// [`Error::PathTraversal`]. A name that normalizes to nothing (`./`) yields
/// `None`.
pub fn sanitize_entry_name(name: &str, destination: &Path) -> Result<Option<PathBuf>> {
    let traversal = || Error::PathTraversal {
        entry: name.to_string(),
        resolved: destination.join(name),
    };

    if name.contains('\0') || name.starts_with(['/', '\\']) || has_drive_prefix(name) {
        return Err(traversal());
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in name.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop().ok_or_else(traversal)?;
            }
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Ok(None);
    }

    let mut resolved = destination.to_path_buf();
    resolved.extend(parts);
    Ok(Some(resolved))
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
