pub mod copy_dir;
pub mod create_file;
pub mod move_path;

pub use copy_dir::copy_dir_all;
pub use create_file::create_file;
pub use move_path::{MoveStrategy, move_path, rename};
