use derive_more::Deref;
use std::io::{self, ErrorKind};

#[derive(PartialEq, Eq, Debug)]
pub enum ReadResult<T> {
    EOF,
    Some(usize, T),
}

#[derive(Deref, Clone, Copy, PartialEq, Eq, Debug)]
pub struct WriteLen(usize);
impl WriteLen {
    pub fn new_manual(i: usize) -> Self {
        Self(i)
    }
}

/// Whether the error came from the stream ending mid-record.
pub fn is_truncation(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| match cause.downcast_ref::<io::Error>() {
        Some(io_e) => io_e.kind() == ErrorKind::UnexpectedEof,
        None => false,
    })
}
