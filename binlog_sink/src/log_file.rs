use crate::{fs_utils, ConfigurationError, LogFileName, LogFileOptions, SerialNo};
use anyhow::Result;
use binlog_codec::{Appended, LogEncoder, LogWriter, ObjectTable, TextEncoder};
use binlog_types::types::{Arg, LogLevel, LogRecord};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// The file currently written for one level.
pub(crate) struct OpenLogFile {
    writer: Arc<dyn LogWriter>,
    name: LogFileName,
    header_len: usize,
}

impl OpenLogFile {
    /// Creates the file and writes its header: the banner, the options line, and `initial_message`.
    ///
    /// `created` is both the time in the file name and the stream's start time.
    pub fn create(
        options: &LogFileOptions,
        objects: &Arc<ObjectTable>,
        initial_message: &str,
        level: LogLevel,
        serial: SerialNo,
        created: DateTime<Utc>,
    ) -> Result<Self, ConfigurationError> {
        let name = LogFileName::format(
            &options.directory,
            level,
            created,
            serial,
            options.plaintext,
        );

        let file = fs_utils::create_new_file(&name.path)
            .map_err(|e| ConfigurationError::cant_open_file(&name.path, e))?;
        let objects = Arc::clone(objects);
        let res: Result<Arc<dyn LogWriter>> = if options.plaintext {
            TextEncoder::with_start(file, objects, LogLevel::None, created)
                .map(|enc| enc as Arc<dyn LogWriter>)
        } else {
            LogEncoder::with_start(file, objects, LogLevel::None, created)
                .map(|enc| enc as Arc<dyn LogWriter>)
        };
        let writer = res.map_err(|e| ConfigurationError::io(&name.path, e))?;

        let header_line = options.header_line(*serial);
        for body in [header_line.as_str(), initial_message] {
            let args = [Arg::str(body)];
            let rec = LogRecord::new("", level, None, "---- %s ----", &args);
            writer
                .log_bounded(&rec, None)
                .map_err(|e| ConfigurationError::io(&name.path, e))?;
        }
        writer
            .flush()
            .map_err(|e| ConfigurationError::io(&name.path, e))?;

        let header_len = writer.encoded_len();
        Ok(Self {
            writer,
            name,
            header_len,
        })
    }

    pub fn name(&self) -> &LogFileName {
        &self.name
    }

    pub fn has_body(&self) -> bool {
        self.writer.encoded_len() > self.header_len
    }

    pub fn append(&self, rec: &LogRecord<'_>, limit: Option<usize>) -> Result<Appended> {
        self.writer.log_bounded(rec, limit)
    }

    pub fn flush(&self) -> Result<()> {
        self.writer.flush()
    }
}
