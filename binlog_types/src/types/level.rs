use anyhow::{anyhow, Result};
use derive_more::{Deref, From};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use std::any;
use std::fmt;
use std::io::{self, Read};
use std::mem;
use std::str::FromStr;

/// Severity, ordered by increasing importance.
///
/// The integer values are part of the binary format and of the
/// `fileLogLevel=` field in file headers. Do not renumber.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum LogLevel {
    None = 0,
    Verbose = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
}

impl LogLevel {
    /// The levels that may own a log file.
    pub const FILE_LEVELS: [LogLevel; 4] = [
        LogLevel::Verbose,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::Verbose => "verbose",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }

    /// File levels at or above `self`. `None` counts as `Verbose`.
    pub fn file_levels_from(self) -> impl Iterator<Item = LogLevel> {
        Self::FILE_LEVELS
            .into_iter()
            .filter(move |level| *level >= self)
    }

    pub fn as_index(self) -> usize {
        *LevelInt::from(self) as usize
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let level = match s.to_ascii_lowercase().as_str() {
            "none" => LogLevel::None,
            "verbose" => LogLevel::Verbose,
            "info" => LogLevel::Info,
            "warning" | "warn" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => return Err(anyhow!("Unknown {} {s:?}", any::type_name::<Self>())),
        };
        Ok(level)
    }
}

#[derive(From, Deref, Clone, Copy)]
pub struct LevelInt(u8);
impl From<LogLevel> for LevelInt {
    fn from(level: LogLevel) -> Self {
        let int = level.to_u8().unwrap();
        Self(int)
    }
}
impl TryFrom<LevelInt> for LogLevel {
    type Error = anyhow::Error;
    fn try_from(int: LevelInt) -> Result<Self> {
        LogLevel::from_u8(int.0).ok_or(anyhow!(
            "Unknown {} {}",
            any::type_name::<LevelInt>(),
            int.0
        ))
    }
}
impl LevelInt {
    pub fn deser(r: &mut impl Read) -> Result<(usize, Self), io::Error> {
        let mut buf = [0u8; mem::size_of::<u8>()];
        r.read_exact(&mut buf)?;
        Ok((buf.len(), Self(buf[0])))
    }
}

/// Maps a level to the label printed after the domain in decoded text.
///
/// Levels past the end of the table, and empty entries, print no label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelLabels(Vec<String>);

impl LevelLabels {
    pub fn standard() -> Self {
        Self::from(&["", "VERBOSE", "INFO", "WARNING", "ERROR"][..])
    }

    pub fn none() -> Self {
        Self(vec![])
    }

    pub fn label(&self, level: LogLevel) -> &str {
        self.0
            .get(level.as_index())
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl<S: AsRef<str>> From<&[S]> for LevelLabels {
    fn from(labels: &[S]) -> Self {
        Self(labels.iter().map(|s| s.as_ref().to_string()).collect())
    }
}
