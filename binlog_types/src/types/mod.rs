mod arg;
mod level;
mod obj_ref;
mod record;

pub use arg::*;
pub use level::*;
pub use obj_ref::*;
pub use record::*;
