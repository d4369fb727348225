use crate::pipeline::helpers::{decode_files, join_tasks, level_files};
use anyhow::Result;
use binlog_sink::{FileSink, LogFileOptions};
use binlog_types::types::{Arg, LevelLabels, LogLevel};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const TASK_COUNT: usize = 8;
const RECORDS_PER_TASK: i32 = 300;

fn options(dir: &Path) -> LogFileOptions {
    let mut options = LogFileOptions::new(dir, LogLevel::Verbose);
    options.max_file_size = 4096;
    options.max_retained_count = 1000;
    options
}

/// Sequence numbers found in `dir`, per task.
fn read_seqs(dir: &Path, seqs: &mut HashMap<usize, Vec<i32>>) -> Result<()> {
    let re = Regex::new(r"\[Task(\d+)\] [A-Z]+: task (\d+) seq (\d+)$")?;
    for level in LogLevel::FILE_LEVELS {
        let names = level_files(dir, level)?;
        for text in decode_files(&names, &LevelLabels::standard())? {
            for line in text.lines() {
                if let Some(caps) = re.captures(line) {
                    assert_eq!(&caps[1], &caps[2], "{line}");
                    let task_i = caps[1].parse::<usize>()?;
                    assert_eq!(LogLevel::FILE_LEVELS[task_i % 4], level, "{line}");
                    seqs.entry(task_i).or_default().push(caps[3].parse()?);
                }
            }
        }
    }
    Ok(())
}

/// Writers on many threads, with a reconfiguration while they run.
/// Each writer's records appear whole and in order, first in the old directory, then in the new.
pub async fn test_concurrent_writers() -> Result<()> {
    let dir_1 = tempfile::tempdir()?;
    let dir_2 = tempfile::tempdir()?;
    let sink = Arc::new(FileSink::new());
    sink.configure(options(dir_1.path()), "First")?;

    let mut tasks = vec![];
    for task_i in 0..TASK_COUNT {
        let sink = Arc::clone(&sink);
        tasks.push(tokio::spawn(async move {
            let level = LogLevel::FILE_LEVELS[task_i % 4];
            let domain = format!("Task{task_i}");
            for seq in 0..RECORDS_PER_TASK {
                let args = [Arg::I32(task_i as i32), Arg::I32(seq)];
                sink.log(&domain, level, None, "task %d seq %d", &args);
                if seq % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            Ok::<(), anyhow::Error>(())
        }));
    }

    tokio::time::sleep(Duration::from_millis(2)).await;
    sink.configure(options(dir_2.path()), "Second")?;

    join_tasks(tasks).await?;
    sink.disable();

    let mut seqs = HashMap::new();
    read_seqs(dir_1.path(), &mut seqs)?;
    read_seqs(dir_2.path(), &mut seqs)?;

    assert_eq!(TASK_COUNT, seqs.len());
    let expected = (0..RECORDS_PER_TASK).collect::<Vec<_>>();
    for (task_i, seqs) in seqs.iter() {
        assert_eq!(&expected, seqs, "Task{task_i}");
    }

    Ok(())
}
