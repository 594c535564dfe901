use crate::{Error, Result};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::str::FromStr;

/// Read/write/execute flags for one permission class (owner, group or other).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Access {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Access {
    /// Decode a single octal digit. Bits above `0o7` are ignored.
    pub fn from_digit(digit: u32) -> Self {
        Self {
            read: digit & 0b100 != 0,
            write: digit & 0b010 != 0,
            execute: digit & 0b001 != 0,
        }
    }

    pub fn digit(self) -> u32 {
        (u32::from(self.read) << 2) | (u32::from(self.write) << 1) | u32::from(self.execute)
    }
}

/// The nine POSIX permission bits: owner, group and other by read, write and execute.
///
/// Displays and parses in the symbolic form used by `ls -l`, e.g. `rwxr-xr-x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PermissionSet {
    pub owner: Access,
    pub group: Access,
    pub other: Access,
}

impl PermissionSet {
    /// The set as octal mode bits in `0..=0o777`.
    pub fn mode(self) -> u32 {
        (self.owner.digit() << 6) | (self.group.digit() << 3) | self.other.digit()
    }
}

/// Decode an integer mode into a [`PermissionSet`].
///
/// Only the three low octal digits are considered; file type, setuid, setgid
/// and sticky bits are dropped.
///
/// ```
/// use cmake_fs::permissions::decode;
///
/// let set = decode(0o100755);
/// assert_eq!(set.mode(), 0o755);
/// assert_eq!(set.to_string(), "rwxr-xr-x");
/// ```
pub fn decode(mode: u32) -> PermissionSet {
    PermissionSet {
        owner: Access::from_digit((mode >> 6) & 0o7),
        group: Access::from_digit((mode >> 3) & 0o7),
        other: Access::from_digit(mode & 0o7),
    }
}

/// Convert a [`PermissionSet`] into the platform's native permission value.
///
/// Returns `None` where POSIX permissions do not exist. Callers are expected to
/// check for POSIX support first and skip permission handling altogether.
#[cfg(unix)]
pub fn encode(set: PermissionSet) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(set.mode()))
}

#[cfg(not(unix))]
pub fn encode(_set: PermissionSet) -> Option<fs::Permissions> {
    None
}

/// Give the owner full access to the directory at `path` if any owner bit is
/// missing, returning the permissions it had before.
///
/// A locked directory refuses both the removal of its children and, on Unix,
/// a move to another parent. Files, symlinks and missing paths are left alone.
#[cfg(unix)]
pub fn unlock_dir(path: &Path) -> Result<Option<fs::Permissions>> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let previous = metadata.permissions();
    if !metadata.is_dir() || previous.mode() & 0o700 == 0o700 {
        return Ok(None);
    }

    fs::set_permissions(path, fs::Permissions::from_mode(previous.mode() | 0o700)).map_err(
        |e| Error::Write {
            path: path.to_path_buf(),
            source: e,
        },
    )?;
    Ok(Some(previous))
}

#[cfg(not(unix))]
pub fn unlock_dir(_path: &Path) -> Result<Option<fs::Permissions>> {
    Ok(None)
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for access in [self.owner, self.group, self.other] {
            let r = if access.read { 'r' } else { '-' };
            let w = if access.write { 'w' } else { '-' };
            let x = if access.execute { 'x' } else { '-' };
            write!(f, "{r}{w}{x}")?;
        }
        Ok(())
    }
}

impl FromStr for PermissionSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 9 {
            return Err(Error::InvalidPermissions(s.to_string()));
        }

        let mut classes = [Access::default(); 3];
        for (class, triple) in classes.iter_mut().zip(chars.chunks(3)) {
            let flag = |c: char, expected: char| match c {
                '-' => Ok(false),
                c if c == expected => Ok(true),
                _ => Err(Error::InvalidPermissions(s.to_string())),
            };
            *class = Access {
                read: flag(triple[0], 'r')?,
                write: flag(triple[1], 'w')?,
                execute: flag(triple[2], 'x')?,
            };
        }

        let [owner, group, other] = classes;
        Ok(Self { owner, group, other })
    }
}

/// Permissions to give a file or directory as it is materialised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PermissionMode {
    /// Leave it to the platform: umask on Unix, inherited ACLs on Windows.
    #[default]
    Inherit,

    /// Apply exactly these bits.
    Custom(PermissionSet),
}

impl PermissionMode {
    /// Interpret a raw archive mode. Missing or all-zero permission bits mean the
    /// archive did not record any and the platform default applies.
    pub fn from_raw(mode: Option<u32>) -> Self {
        match mode {
            Some(mode) if mode & 0o777 != 0 => Self::Custom(decode(mode)),
            _ => Self::Inherit,
        }
    }

    pub fn set(self) -> Option<PermissionSet> {
        match self {
            Self::Inherit => None,
            Self::Custom(set) => Some(set),
        }
    }

    /// Apply the permission mode to an existing path.
    ///
    /// A no-op for [`PermissionMode::Inherit`] and on platforms without POSIX
    /// permissions.
    pub fn apply_to_path(self, path: &Path) -> Result<()> {
        let Some(permissions) = self.set().and_then(encode) else {
            return Ok(());
        };
        fs::set_permissions(path, permissions).map_err(|e| Error::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Configure `options` so that a newly created file receives this mode at
    /// creation time instead of through a later `chmod`.
    pub fn apply_to_open_options(self, options: &mut OpenOptions) {
        #[cfg(unix)]
        if let Some(set) = self.set() {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(set.mode());
        }
        #[cfg(not(unix))]
        let _ = options;
    }
}

impl From<PermissionSet> for PermissionMode {
    fn from(set: PermissionSet) -> Self {
        Self::Custom(set)
    }
}
