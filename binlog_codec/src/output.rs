use anyhow::Result;
use std::io::Write;
use std::mem;

/// Pending bytes beyond this are written out by the logging thread itself.
pub const EAGER_FLUSH_LEN: usize = 64 * 1024;

/// A byte sink plus the bytes not yet handed to it.
///
/// Pending bytes age on each flush tick. A tick that finds them already aged writes them out.
pub(crate) struct PendingOutput<W> {
    out: W,
    pending: Vec<u8>,
    encoded_len: usize,
    aged: bool,
}

impl<W: Write> PendingOutput<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pending: vec![],
            encoded_len: 0,
            aged: false,
        }
    }

    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if self.pending.is_empty() {
            self.aged = false;
        }
        self.pending.extend_from_slice(bytes);
        self.encoded_len += bytes.len();

        if self.pending.len() >= EAGER_FLUSH_LEN {
            self.flush()?;
        }
        Ok(())
    }

    /// Pending bytes are discarded even if writing them fails.
    pub fn flush(&mut self) -> Result<()> {
        self.aged = false;
        let pending = mem::take(&mut self.pending);
        if pending.is_empty() == false {
            self.out.write_all(&pending)?;
        }
        self.out.flush()?;

        self.pending = pending;
        self.pending.clear();
        Ok(())
    }

    pub fn tick(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            self.aged = false;
        } else if self.aged {
            self.flush()?;
        } else {
            self.aged = true;
        }
        Ok(())
    }

    /// Total bytes appended, whether or not yet flushed.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    pub fn with_parts<R>(&mut self, f: impl FnOnce(&[u8], &mut W) -> R) -> R {
        f(&self.pending, &mut self.out)
    }
}
