//! Extraction engine for CMake binary distributions.
//!
//! # Architecture
//!
//! - `format.rs` - Extension chains and compression codecs
//! - `detect.rs` - Magic-byte container detection
//! - `sanitize.rs` - Entry name validation (path traversal prevention)
//! - `decompress.rs` - Peel one compression layer into a staging directory
//! - `unpack/` - Per-container entry sources and the entry writer
//! - `extract.rs` - Staged, layer-by-layer extraction into a target
//! - `normalize.rs` - Collapse the extracted tree onto its `bin` parent

pub use decompress::decompress;
pub use entry::{ArchiveEntry, EntryKind, SkippedEntry, UnpackReport};
pub use error::{Error, ErrorKind, Result};
pub use extract::extract;
pub use format::{Compression, ContainerFormat, Extension, ExtensionChain};
pub use normalize::{find_canonical_root, normalize, normalize_with};
pub use options::ExtractOptions;
pub use sanitize::sanitize_entry_name;
pub use unpack::{EntrySource, unpack, unpack_entries};

mod copy;
mod decompress;
pub mod detect;
pub mod entry;
mod error;
mod extract;
pub mod format;
mod normalize;
pub mod options;
mod sanitize;
pub mod unpack;
