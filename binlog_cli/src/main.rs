//! Decodes binary log files to text.

mod decode;

use anyhow::Result;
use binlog_types::types::LevelLabels;
use clap::{Parser, ValueEnum};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode binary log files to text", long_about = None)]
struct Args {
    /// Log files, or directories holding rotated log files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Level labels to print after the domain
    #[arg(long, value_enum, default_value_t = Labels::Standard)]
    labels: Labels,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Labels {
    Standard,
    None,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let labels = match args.labels {
        Labels::Standard => LevelLabels::standard(),
        Labels::None => LevelLabels::none(),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for path in args.paths.iter() {
        decode::decode_path(path, &labels, &mut out)?;
    }
    out.flush()?;

    Ok(())
}
