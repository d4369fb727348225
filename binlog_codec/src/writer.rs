use crate::Flushable;
use anyhow::Result;
use binlog_types::serde::WriteLen;
use binlog_types::types::LogRecord;
use chrono::{DateTime, Utc};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Appended {
    Written(WriteLen),
    /// Nothing was written, and the stream's state is as before the call.
    WouldExceed,
    /// Below the writer's minimum level.
    Filtered,
}

/// One output stream of log records, binary or rendered.
pub trait LogWriter: Flushable {
    /// Appends the record unless the stream's total length would then exceed `limit`.
    fn log_bounded(&self, rec: &LogRecord<'_>, limit: Option<usize>) -> Result<Appended>;

    /// Bytes produced so far, including the stream header and unflushed bytes.
    fn encoded_len(&self) -> usize;

    /// The stream's start, truncated to whole seconds.
    fn start_time(&self) -> DateTime<Utc>;
}
