use anyhow::{Context, Result};
use binlog_codec::LogDecoder;
use binlog_sink::{list_log_files, LogFileName};
use binlog_types::types::{LevelLabels, ObjectRef};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// A directory is decoded one level at a time, each level's files in serial order,
/// with object names carried from each file to the next.
pub fn decode_path(path: &Path, labels: &LevelLabels, out: &mut impl Write) -> Result<()> {
    if path.is_dir() {
        return decode_dir(path, labels, out);
    }
    let plaintext = match LogFileName::parse(path.to_path_buf()) {
        Ok(name) => name.plaintext,
        Err(_) => false,
    };
    decode_file(path, plaintext, labels, HashMap::new(), out)?;
    Ok(())
}

fn decode_dir(dir: &Path, labels: &LevelLabels, out: &mut impl Write) -> Result<()> {
    let names = list_log_files(dir)?;

    let mut object_names = HashMap::new();
    let mut prev_level = None;
    for name in names {
        if prev_level != Some(name.level) {
            object_names = HashMap::new();
            prev_level = Some(name.level);
        }

        writeln!(out, "==> {} <==", name.path.display())?;
        match decode_file(&name.path, name.plaintext, labels, object_names.clone(), out) {
            Ok(names_after) => object_names = names_after,
            Err(e) => {
                tracing::warn!(path = ?name.path, error = ?e, "Skipping undecodable log file.");
            }
        }
    }
    Ok(())
}

fn decode_file(
    path: &Path,
    plaintext: bool,
    labels: &LevelLabels,
    object_names: HashMap<ObjectRef, String>,
    out: &mut impl Write,
) -> Result<HashMap<ObjectRef, String>> {
    let mut file = File::open(path).with_context(|| format!("open {path:?}"))?;

    if plaintext {
        io::copy(&mut file, out).with_context(|| format!("copy {path:?}"))?;
        return Ok(object_names);
    }

    let mut decoder = LogDecoder::new(file)
        .with_context(|| format!("decode {path:?}"))?
        .with_object_names(object_names);
    decoder
        .render_all(out, labels)
        .with_context(|| format!("decode {path:?}"))?;
    Ok(decoder.into_object_names())
}
