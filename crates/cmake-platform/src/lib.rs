//! Platform model for CMake binary distributions: which archive to fetch,
//! whether permission bits can be restored, and where to look for a system
//! CMake when no archive exists.

pub use arch::Architecture;
pub use error::{Error, Result};
pub use os::OperatingSystem;
pub use platform::Platform;

pub mod arch;
mod error;
pub mod os;
pub mod platform;
