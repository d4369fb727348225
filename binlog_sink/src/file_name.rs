use crate::fs_utils;
use anyhow::{anyhow, Result};
use binlog_types::types::LogLevel;
use chrono::{DateTime, Utc};
use derive_more::{Deref, Display, From};
use std::path::{Path, PathBuf};

pub const FILE_NAME_PREFIX: &str = "binlog_";
pub const BINARY_SUFFIX: &str = ".binlog";
pub const PLAINTEXT_SUFFIX: &str = ".txt";

/// Position of a file in its directory's rotation sequence. Starts at 1.
#[derive(From, Deref, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SerialNo(u64);
impl SerialNo {
    pub const FIRST: Self = Self(1);

    pub fn format_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
    pub fn parse_hex<S: AsRef<str>>(s: S) -> Result<Self> {
        let s = s.as_ref();
        if s.len() != 16 {
            return Err(anyhow!("Not 16 chars long. {s}"));
        }
        let i = u64::from_str_radix(s, 16).map_err(|e| anyhow!(e))?;
        Ok(Self(i))
    }
}

/// The parsed name of one log file.
///
/// ```text
/// dir/
///     binlog_<level>_<created millis>_<serial hex>.binlog
///     binlog_<level>_<created millis>_<serial hex>.txt
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LogFileName {
    pub path: PathBuf,
    pub level: LogLevel,
    pub created_millis: i64,
    pub serial: SerialNo,
    pub plaintext: bool,
}

impl LogFileName {
    pub fn format(
        dir: &Path,
        level: LogLevel,
        created: DateTime<Utc>,
        serial: SerialNo,
        plaintext: bool,
    ) -> Self {
        let created_millis = created.timestamp_millis();
        let suffix = if plaintext {
            PLAINTEXT_SUFFIX
        } else {
            BINARY_SUFFIX
        };
        let file_name = format!(
            "{FILE_NAME_PREFIX}{}_{created_millis}_{}{suffix}",
            level.name(),
            serial.format_hex()
        );
        Self {
            path: dir.join(file_name),
            level,
            created_millis,
            serial,
            plaintext,
        }
    }

    pub fn parse(path: PathBuf) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Invalid file name. {path:?}"))?;

        let (stem, plaintext) = if let Some(stem) = file_name.strip_suffix(BINARY_SUFFIX) {
            (stem, false)
        } else if let Some(stem) = file_name.strip_suffix(PLAINTEXT_SUFFIX) {
            (stem, true)
        } else {
            return Err(anyhow!("Wrong name format. {file_name}"));
        };
        let stem = stem
            .strip_prefix(FILE_NAME_PREFIX)
            .ok_or_else(|| anyhow!("Wrong name format. {file_name}"))?;

        let mut parts = stem.split('_');
        let (level, created_millis, serial) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(level), Some(created_millis), Some(serial), None) => (level, created_millis, serial),
            _ => return Err(anyhow!("Wrong name format. {file_name}")),
        };

        let level = level.parse::<LogLevel>()?;
        if level == LogLevel::None {
            return Err(anyhow!("No file serves level {level}. {file_name}"));
        }
        let created_millis = created_millis.parse::<i64>()?;
        let serial = SerialNo::parse_hex(serial)?;

        Ok(Self {
            path,
            level,
            created_millis,
            serial,
            plaintext,
        })
    }
}

/// Log files in `dir`, ordered by level, then by serial number.
/// Files with other names are skipped.
pub fn list_log_files<P: AsRef<Path>>(dir: P) -> Result<Vec<LogFileName>> {
    let mut names = vec![];
    for path in fs_utils::read_dir(dir.as_ref())? {
        if let Ok(name) = LogFileName::parse(path?) {
            names.push(name);
        }
    }
    names.sort_by(|a, b| (a.level, a.serial, &a.path).cmp(&(b.level, b.serial, &b.path)));
    Ok(names)
}
