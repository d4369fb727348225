//! Helpers shared by the pipeline tests.

use anyhow::Result;
use binlog_codec::LogDecoder;
use binlog_sink::{list_log_files, LogFileName, LogFileOptions};
use binlog_types::types::{LevelLabels, LogLevel, ObjectRef};
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const TIMESTAMP: &str = r"\d{2}:\d{2}:\d{2}\.\d{6}Z\| ";
pub const DATESTAMP: &str = r"\w+ \d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z";

pub fn banner_regex() -> Result<Regex> {
    let re = Regex::new(&format!(
        "^{TIMESTAMP}---- Logging begins on {DATESTAMP} ----$"
    ))?;
    Ok(re)
}

/// Matches a whole decoded stream: the banner, then exactly these lines, each after a timestamp.
/// `lines` are regex patterns.
pub fn stream_regex(lines: &[&str]) -> Result<Regex> {
    let mut pattern = format!("^{TIMESTAMP}---- Logging begins on {DATESTAMP} ----\n");
    for line in lines {
        pattern += &format!("{TIMESTAMP}{line}\n");
    }
    pattern += "$";
    Ok(Regex::new(&pattern)?)
}

pub fn decode_bytes(bytes: Vec<u8>, labels: &LevelLabels) -> Result<String> {
    let mut out = vec![];
    LogDecoder::new(Cursor::new(bytes))?.render_all(&mut out, labels)?;
    Ok(String::from_utf8(out)?)
}

/// Decodes files in the given order, carrying object names from each file to the next.
/// Plaintext files are read as-is.
pub fn decode_files(names: &[LogFileName], labels: &LevelLabels) -> Result<Vec<String>> {
    let mut object_names: HashMap<ObjectRef, String> = HashMap::new();
    let mut texts = vec![];
    for name in names {
        if name.plaintext {
            texts.push(fs::read_to_string(&name.path)?);
            continue;
        }
        let mut out = vec![];
        let mut decoder =
            LogDecoder::new(File::open(&name.path)?)?.with_object_names(object_names);
        decoder.render_all(&mut out, labels)?;
        object_names = decoder.into_object_names();
        texts.push(String::from_utf8(out)?);
    }
    Ok(texts)
}

/// A byte sink that a test can read while an encoder owns a clone of it.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub async fn join_tasks(tasks: Vec<JoinHandle<Result<()>>>) -> Result<()> {
    for task in tasks {
        task.await??;
    }
    Ok(())
}

/// The files of one level, in serial order.
pub fn level_files(dir: &Path, level: LogLevel) -> Result<Vec<LogFileName>> {
    let names = list_log_files(dir)?
        .into_iter()
        .filter(|name| name.level == level)
        .collect();
    Ok(names)
}

/// Matches the two header records that follow the banner of every file.
pub fn header_regexes(
    options: &LogFileOptions,
    serial: u64,
    level: LogLevel,
    initial_message: &str,
) -> Result<[Regex; 2]> {
    let label = LevelLabels::standard().label(level).to_string();
    let options_line = regex::escape(&options.header_line(serial));
    let initial_message = regex::escape(initial_message);
    Ok([
        Regex::new(&format!("^{TIMESTAMP}{label}: ---- {options_line} ----$"))?,
        Regex::new(&format!("^{TIMESTAMP}{label}: ---- {initial_message} ----$"))?,
    ])
}
