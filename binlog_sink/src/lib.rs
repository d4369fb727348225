mod error;
mod file_name;
pub mod fs_utils;
mod log_file;
mod options;
mod rotation_group;
mod sink;

pub use error::*;
pub use file_name::*;
pub use options::*;
pub use sink::*;
