//! Filesystem building blocks for unpacking CMake distributions.
//!
//! - [`permissions`]: decode integer modes into permission sets and apply them
//! - [`remove_dir_all`]: recursive removal that retries "directory not empty"
//! - [`Workspace`]: a staging directory promoted into place on commit
//! - [`primitives`]: file creation with modes, tree copy, renames that survive
//!   read-only directories and cross-device moves

pub mod error;
pub mod permissions;
pub mod primitives;
pub mod remove;
pub mod workspace;

pub use error::{Error, Result};
pub use permissions::{PermissionMode, PermissionSet, unlock_dir};
pub use primitives::{MoveStrategy, copy_dir_all, create_file, move_path, rename};
pub use remove::{RemoveOptions, RetryOutcome, remove_dir_all, retry_remove};
pub use workspace::Workspace;
