use crate::rotation_group::RotationGroup;
use crate::{ConfigurationError, LogFileName, LogFileOptions, SerialNo};
use anyhow::Result;
use binlog_codec::ObjectTable;
use binlog_types::types::{Arg, LogLevel, LogRecord, ObjectRef};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, OnceLock};

/// Routes log records to one rotating file per level.
///
/// The active set of files is replaced as a whole by [`Self::configure`].
/// Writers that picked up the previous set before the swap finish against it,
/// and its files close when the last such writer is done.
pub struct FileSink {
    active: RwLock<Option<Arc<RotationGroup>>>,
    configuring: Mutex<()>,
    objects: Arc<ObjectTable>,
}

impl Default for FileSink {
    fn default() -> Self {
        Self::with_objects(ObjectTable::new())
    }
}

impl FileSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(objects: Arc<ObjectTable>) -> Self {
        Self {
            active: RwLock::new(None),
            configuring: Mutex::new(()),
            objects,
        }
    }

    /// The process-wide sink. It shares [`ObjectTable::shared`].
    pub fn global() -> &'static FileSink {
        static GLOBAL: OnceLock<FileSink> = OnceLock::new();
        GLOBAL.get_or_init(|| FileSink::with_objects(ObjectTable::shared()))
    }

    pub fn objects(&self) -> &Arc<ObjectTable> {
        &self.objects
    }

    /// Opens a new set of files and makes it active, returning the options it replaced.
    ///
    /// On failure, nothing is left behind on disk and the active configuration is untouched.
    pub fn configure(
        &self,
        options: LogFileOptions,
        initial_message: &str,
    ) -> Result<Option<LogFileOptions>, ConfigurationError> {
        let _configuring = self.configuring.lock();

        let group = RotationGroup::open(options, initial_message, Arc::clone(&self.objects))?;
        let prev = self.active.write().replace(Arc::new(group));

        Ok(prev.map(|group| group.options().clone()))
    }

    /// Stops logging to files, returning the options that were active.
    pub fn disable(&self) -> Option<LogFileOptions> {
        let _configuring = self.configuring.lock();
        let prev = self.active.write().take();
        prev.map(|group| group.options().clone())
    }

    /// Reinstates a configuration captured earlier from [`Self::configure`] or [`Self::current_configuration`].
    pub fn restore(
        &self,
        options: Option<LogFileOptions>,
        initial_message: &str,
    ) -> Result<Option<LogFileOptions>, ConfigurationError> {
        match options {
            Some(options) => self.configure(options, initial_message),
            None => Ok(self.disable()),
        }
    }

    pub fn current_configuration(&self) -> Option<LogFileOptions> {
        self.active_group().map(|group| group.options().clone())
    }

    fn active_group(&self) -> Option<Arc<RotationGroup>> {
        self.active.read().clone()
    }

    /// Never fails. Problems writing are reported through `tracing`.
    ///
    /// The record is timestamped once its level's file is free to take it.
    pub fn log(
        &self,
        domain: &str,
        level: LogLevel,
        object: Option<ObjectRef>,
        template: &str,
        args: &[Arg<'_>],
    ) {
        if let Some(group) = self.active_group() {
            group.log_with(level, || LogRecord::new(domain, level, object, template, args));
        }
    }

    /// Keeps the record's own timestamp.
    pub fn log_record(&self, rec: &LogRecord<'_>) {
        if let Some(group) = self.active_group() {
            group.log(rec);
        }
    }

    /// Writes out every pending byte of every open file.
    pub fn flush(&self) -> Result<()> {
        match self.active_group() {
            None => Ok(()),
            Some(group) => group.flush(),
        }
    }

    pub fn current_serial_no(&self, level: LogLevel) -> Option<SerialNo> {
        self.current_file(level).map(|name| name.serial)
    }

    pub fn current_file(&self, level: LogLevel) -> Option<LogFileName> {
        self.active_group()?.current_file(level)
    }
}
