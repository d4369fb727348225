use crate::log_file::OpenLogFile;
use crate::{fs_utils, list_log_files, ConfigurationError, LogFileName, LogFileOptions, SerialNo};
use anyhow::Result;
use binlog_codec::{Appended, ObjectTable};
use binlog_types::types::{LogLevel, LogRecord};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shorthand::ShortHand;
use std::mem;
use std::sync::Arc;

/// The files opened by one `configure()` call, one per level, sharing a serial number sequence.
#[derive(ShortHand)]
#[shorthand(disable(get))]
pub(crate) struct RotationGroup {
    #[shorthand(enable(get))]
    options: LogFileOptions,
    initial_message: String,
    objects: Arc<ObjectTable>,
    /// Advanced only once a file bearing it exists.
    next_serial: Mutex<SerialNo>,
    files: Vec<LevelFile>,
}

struct LevelFile {
    level: LogLevel,
    /// Held while appending, and while rotating, so that each record lands whole in one file.
    current: Mutex<OpenLogFile>,
}

impl RotationGroup {
    /// All files are created, or none are. Older files beyond the retained count are then purged.
    pub fn open(
        options: LogFileOptions,
        initial_message: &str,
        objects: Arc<ObjectTable>,
    ) -> Result<Self, ConfigurationError> {
        let existing = list_log_files(&options.directory)
            .map_err(|e| ConfigurationError::cant_open_file(&options.directory, e))?;
        let serial = existing
            .iter()
            .map(|name| *name.serial + 1)
            .max()
            .map_or(SerialNo::FIRST, SerialNo::from);

        let created = Utc::now();
        let mut files = vec![];
        for level in options.minimum_level.file_levels_from() {
            match OpenLogFile::create(&options, &objects, initial_message, level, serial, created) {
                Ok(file) => files.push(LevelFile {
                    level,
                    current: Mutex::new(file),
                }),
                Err(e) => {
                    let paths = files
                        .drain(..)
                        .map(|file| file.current.into_inner().name().path.clone())
                        .collect::<Vec<_>>();
                    for path in paths {
                        if let Err(e) = fs_utils::remove_file(&path) {
                            tracing::warn!(error = ?e, "Cannot remove partially configured log file.");
                        }
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!(
            dir = ?options.directory,
            serial = *serial,
            "Configured log files."
        );

        let group = Self {
            options,
            initial_message: initial_message.to_string(),
            objects,
            next_serial: Mutex::new(SerialNo::from(*serial + 1)),
            files,
        };
        for level_file in group.files.iter() {
            group.purge_or_warn(level_file.level);
        }
        Ok(group)
    }

    fn level_file(&self, level: LogLevel) -> Option<&LevelFile> {
        self.files.iter().find(|file| file.level == level)
    }

    /// Write errors are reported through `tracing`, not to the caller.
    pub fn log(&self, rec: &LogRecord<'_>) {
        self.log_with(rec.level, || rec.clone());
    }

    /// Builds the record once this level's file is locked, so that its timestamp is
    /// not older than a file opened by a rotation that this call waited on.
    pub fn log_with<'r>(&self, level: LogLevel, make_rec: impl FnOnce() -> LogRecord<'r>) {
        let level_file = match self.level_file(level) {
            None => return,
            Some(level_file) => level_file,
        };
        let mut current = level_file.current.lock();
        let rec = &make_rec();

        let limit = usize::try_from(self.options.max_file_size).unwrap_or(usize::MAX);
        let res = match current.append(rec, Some(limit)) {
            Ok(Appended::WouldExceed) => {
                if current.has_body() {
                    if let Err(e) = self.rotate(level_file.level, &mut current, rec.timestamp) {
                        tracing::error!(
                            level = %level_file.level,
                            error = ?e,
                            "Cannot rotate log file. Writing past its size limit."
                        );
                    }
                }
                current.append(rec, None)
            }
            res => res,
        };
        if let Err(e) = res {
            tracing::warn!(level = %level_file.level, error = ?e, "Cannot write log record.");
        }
    }

    /// Replaces `current` with a new file bearing the next serial number, then purges old files.
    ///
    /// The new file starts no later than `rec_timestamp`, the time of the record that triggered it.
    fn rotate(
        &self,
        level: LogLevel,
        current: &mut OpenLogFile,
        rec_timestamp: DateTime<Utc>,
    ) -> Result<()> {
        if let Err(e) = current.flush() {
            tracing::warn!(level = %level, error = ?e, "Cannot flush log file before rotation.");
        }

        let next = {
            let mut next_serial = self.next_serial.lock();
            let serial = *next_serial;
            let next = OpenLogFile::create(
                &self.options,
                &self.objects,
                &self.initial_message,
                level,
                serial,
                rec_timestamp.min(Utc::now()),
            )?;
            *next_serial = SerialNo::from(*serial + 1);
            next
        };
        let prev = mem::replace(current, next);
        drop(prev);

        tracing::debug!(
            level = %level,
            serial = *current.name().serial,
            path = ?current.name().path,
            "Rotated log file."
        );

        self.purge_or_warn(level);
        Ok(())
    }

    fn purge_or_warn(&self, level: LogLevel) {
        if let Err(e) = self.purge(level) {
            tracing::warn!(level = %level, error = ?e, "Cannot purge old log files.");
        }
    }

    /// Keeps the newest `max_retained_count + 1` files of this level.
    fn purge(&self, level: LogLevel) -> Result<()> {
        let names = list_log_files(&self.options.directory)?
            .into_iter()
            .filter(|name| name.level == level)
            .collect::<Vec<LogFileName>>();

        let keep = self.options.max_retained_count as usize + 1;
        if names.len() > keep {
            let excess = names.len() - keep;
            for name in &names[..excess] {
                fs_utils::remove_file(&name.path)?;
                tracing::debug!(level = %level, serial = *name.serial, path = ?name.path, "Purged log file.");
            }
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        for level_file in self.files.iter() {
            level_file.current.lock().flush()?;
        }
        Ok(())
    }

    pub fn current_file(&self, level: LogLevel) -> Option<LogFileName> {
        self.level_file(level)
            .map(|level_file| level_file.current.lock().name().clone())
    }
}

impl Drop for RotationGroup {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = ?e, "Cannot flush log files on close.");
        }
        tracing::debug!(dir = ?self.options.directory, "Closed log files.");
    }
}
