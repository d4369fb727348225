use crate::pipeline::helpers::{decode_files, level_files};
use anyhow::{anyhow, Result};
use binlog_codec::LogDecoder;
use binlog_sink::{list_log_files, FileSink, LogFileOptions, SerialNo};
use binlog_types::types::{LevelLabels, LogLevel};
use std::fs::{self, File};

pub fn test_serials_continue_across_configurations() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let sink = FileSink::new();
    let options = LogFileOptions::new(dir.path(), LogLevel::Info);

    assert_eq!(None, sink.current_configuration());
    assert_eq!(None, sink.configure(options.clone(), "First")?);
    assert_eq!(Some(SerialNo::FIRST), sink.current_serial_no(LogLevel::Info));

    let prev = sink.configure(options.clone(), "Second")?;
    assert_eq!(Some(options.clone()), prev);
    for level in LogLevel::Info.file_levels_from() {
        assert_eq!(Some(SerialNo::from(2)), sink.current_serial_no(level));
        assert_eq!(2, level_files(dir.path(), level)?.len());
    }

    assert_eq!(Some(options), sink.disable());
    assert_eq!(None, sink.current_configuration());
    assert_eq!(None, sink.current_serial_no(LogLevel::Info));

    Ok(())
}

/// Each configuration adds one file per level, and the oldest beyond the retained count go.
pub fn test_reconfiguring_keeps_retained_count(max_retained_count: u32) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let sink = FileSink::new();
    let mut options = LogFileOptions::new(dir.path(), LogLevel::Info);
    options.max_retained_count = max_retained_count;

    let configure_count = 4;
    for _ in 0..configure_count {
        sink.configure(options.clone(), "Restarted")?;
    }

    let keep = max_retained_count as u64 + 1;
    let expected = ((configure_count - keep + 1)..=configure_count).collect::<Vec<_>>();
    for level in LogLevel::Info.file_levels_from() {
        let serials = level_files(dir.path(), level)?
            .iter()
            .map(|name| *name.serial)
            .collect::<Vec<_>>();
        assert_eq!(expected, serials, "{level}");
        assert_eq!(
            Some(SerialNo::from(configure_count)),
            sink.current_serial_no(level)
        );
    }

    Ok(())
}

/// The time in a file's name and its stream's start time fall in the same second.
pub fn test_file_name_matches_start_time() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let sink = FileSink::new();
    for _ in 0..3 {
        sink.configure(LogFileOptions::new(dir.path(), LogLevel::Verbose), "Hello")?;
    }
    sink.disable();

    for name in list_log_files(dir.path())? {
        let start = LogDecoder::new(File::open(&name.path)?)?.start_time();
        assert_eq!(name.created_millis / 1000, start.timestamp(), "{name:?}");
    }

    Ok(())
}

pub fn test_levels_below_minimum_have_no_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let sink = FileSink::new();
    sink.configure(LogFileOptions::new(dir.path(), LogLevel::Warning), "Hello")?;

    sink.log("Sync", LogLevel::Info, None, "dropped", &[]);
    sink.log("Sync", LogLevel::Warning, None, "kept", &[]);
    assert_eq!(None, sink.current_file(LogLevel::Info));
    sink.disable();

    let levels = list_log_files(dir.path())?
        .into_iter()
        .map(|name| name.level)
        .collect::<Vec<_>>();
    assert_eq!(vec![LogLevel::Warning, LogLevel::Error], levels);

    let texts = decode_files(
        &level_files(dir.path(), LogLevel::Warning)?,
        &LevelLabels::standard(),
    )?;
    assert!(texts[0].ends_with("| [Sync] WARNING: kept\n"), "{}", texts[0]);

    let dir = tempfile::tempdir()?;
    sink.configure(LogFileOptions::new(dir.path(), LogLevel::None), "Hello")?;
    sink.disable();
    assert_eq!(4, list_log_files(dir.path())?.len());

    Ok(())
}

/// Uses the process-wide sink, and puts back whatever configuration it found.
pub fn test_failure_isolation() -> Result<()> {
    let sink = FileSink::global();
    let found = sink.current_configuration();

    let dir = tempfile::tempdir()?;
    let good = LogFileOptions::new(dir.path(), LogLevel::Info);
    sink.configure(good.clone(), "Good")?;

    // A directory under a regular file can be neither opened nor created.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"")?;
    let bad_dir = blocker.join("logs");
    let e = match sink.configure(LogFileOptions::new(&bad_dir, LogLevel::Info), "Bad") {
        Err(e) => e,
        Ok(_) => return Err(anyhow!("Configured logging under a regular file.")),
    };
    assert_eq!("CantOpenFile", e.category());
    assert_eq!(bad_dir.as_path(), e.path());
    let desc = e.description();
    assert!(desc.contains("File Logger fails to open file"), "{desc}");
    assert!(desc.contains(&bad_dir.display().to_string()), "{desc}");

    assert_eq!(Some(good), sink.current_configuration());

    // The good configuration still takes records.
    sink.log("Config", LogLevel::Info, None, "still here", &[]);
    sink.flush()?;
    let name = sink
        .current_file(LogLevel::Info)
        .ok_or_else(|| anyhow!("No current Info file."))?;
    let texts = decode_files(&[name], &LevelLabels::standard())?;
    assert!(texts[0].ends_with("| [Config] INFO: still here\n"), "{}", texts[0]);

    sink.restore(found.clone(), "Restored")?;
    assert_eq!(found, sink.current_configuration());

    Ok(())
}
