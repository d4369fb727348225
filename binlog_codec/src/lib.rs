mod decoder;
mod encoder;
mod flush_job;
mod object_table;
mod output;
pub mod render;
mod text_encoder;
mod writer;

pub use decoder::*;
pub use encoder::*;
pub use flush_job::*;
pub use object_table::*;
pub use text_encoder::*;
pub use writer::*;
