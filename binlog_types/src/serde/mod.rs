//! # Serialization format
//!
//! A binary log stream is one [`StreamHeader`] followed by zero or more [`WireRecord`]s.
//! All integers are little-endian.
//!
//! Variable-length bodies (strings, byte slices) are preceded by their `u32` length.
//! Names of domains and objects are carried only on their first use within a stream;
//! later records refer to them by number.
//!
//! ```text
//! struct StreamHeader {
//!     magic:              [u8; 4],
//!     format_version:     u8,
//!     start_secs:         u64,
//! }
//!
//! struct WireRecord {
//!     level:              u8,
//!     ts_delta_us:        u64,
//!     domain_id:          u16,
//!     // Only if domain_id equals the count of domains announced so far.
//!     domain_name:        { len: u32, body: [u8; len] },
//!     object_flag:        u8,
//!     // Only if object_flag is Bare or Announce.
//!     token:              u32,
//!     // Only if object_flag is Announce.
//!     object_name:        { len: u32, body: [u8; len] },
//!     template:           { len: u32, body: [u8; len] },
//!     args_count:         u16,
//!     args:               [Arg; args_count],
//! }
//!
//! struct Arg::U16 .. Arg::I64, Arg::Ptr, Arg::Char {
//!     arg_type:           u8,
//!     arg_body:           [u8; width_of(arg_type)],
//! }
//!
//! struct Arg::Str {
//!     arg_type:           u8,
//!     arg_body_len:       u32,
//!     arg_body:           [u8; arg_body_len],
//! }
//!
//! struct Arg::Bytes {
//!     arg_type:           u8,
//!     slice_mode:         u8,
//!     arg_body_len:       u32,
//!     arg_body:           [u8; arg_body_len],
//! }
//! ```
//!
//! A stream that ends in the middle of a record is truncated, not corrupt.
//! See [`is_truncation`].

mod arg;
mod arg_type;
mod lengths;
mod read_result;
mod wire;

pub use arg_type::*;
pub use lengths::*;
pub use read_result::*;
pub use wire::*;
