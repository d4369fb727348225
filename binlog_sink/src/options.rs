use anyhow::{anyhow, Result};
use binlog_types::types::{LevelInt, LogLevel};
use std::env;
use std::path::PathBuf;

pub const ENV_VAR_DIR: &str = "BINLOG_DIR";
pub const ENV_VAR_LEVEL: &str = "BINLOG_LEVEL";
pub const ENV_VAR_MAX_SIZE: &str = "BINLOG_MAX_SIZE";
pub const ENV_VAR_MAX_COUNT: &str = "BINLOG_MAX_COUNT";
pub const ENV_VAR_PLAINTEXT: &str = "BINLOG_PLAINTEXT";

pub const DEFAULT_MAX_FILE_SIZE: u64 = 512 * 1024;
pub const DEFAULT_MAX_RETAINED_COUNT: u32 = 2;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LogFileOptions {
    pub directory: PathBuf,
    /// One file is kept per level from this one up. `None` counts as `Verbose`.
    pub minimum_level: LogLevel,
    pub max_file_size: u64,
    /// Historical files kept per level, besides the current one.
    pub max_retained_count: u32,
    pub plaintext: bool,
}

impl LogFileOptions {
    pub fn new(directory: impl Into<PathBuf>, minimum_level: LogLevel) -> Self {
        Self {
            directory: directory.into(),
            minimum_level,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_retained_count: DEFAULT_MAX_RETAINED_COUNT,
            plaintext: false,
        }
    }

    /// `None` if the directory variable is unset.
    pub fn from_env() -> Result<Option<Self>> {
        let directory = match env::var_os(ENV_VAR_DIR) {
            None => return Ok(None),
            Some(dir) => PathBuf::from(dir),
        };
        let mut options = Self::new(directory, LogLevel::Info);

        if let Ok(level) = env::var(ENV_VAR_LEVEL) {
            options.minimum_level = level.parse()?;
        }
        if let Ok(size) = env::var(ENV_VAR_MAX_SIZE) {
            options.max_file_size = size
                .parse()
                .map_err(|e| anyhow!("{ENV_VAR_MAX_SIZE}={size:?}. {e}"))?;
        }
        if let Ok(count) = env::var(ENV_VAR_MAX_COUNT) {
            options.max_retained_count = count
                .parse()
                .map_err(|e| anyhow!("{ENV_VAR_MAX_COUNT}={count:?}. {e}"))?;
        }
        if let Ok(plaintext) = env::var(ENV_VAR_PLAINTEXT) {
            options.plaintext = matches!(plaintext.to_ascii_lowercase().as_str(), "1" | "true");
        }

        Ok(Some(options))
    }

    /// The body of the second header line of every file.
    pub fn header_line(&self, serial: u64) -> String {
        format!(
            "serialNo={serial},logDirectory={},fileLogLevel={},fileMaxSize={},fileMaxCount={}",
            self.directory.display(),
            *LevelInt::from(self.minimum_level),
            self.max_file_size,
            self.max_retained_count,
        )
    }
}
