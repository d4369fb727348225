use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::iter::Iterator;
use std::path::{Path, PathBuf};

pub fn read_dir<'a>(parent_path: &'a Path) -> Result<impl 'a + Iterator<Item = Result<PathBuf>>> {
    let iter = fs::read_dir(parent_path).with_context(|| format!("read_dir {parent_path:?}"))?;
    let iter = iter.map(move |res_entry| {
        res_entry
            .with_context(|| format!("read_dir entry {parent_path:?}"))
            .map(|entry| entry.path())
    });
    Ok(iter)
}

/// Fails if the file already exists.
pub fn create_new_file<P: AsRef<Path>>(path: P) -> Result<File> {
    let path = path.as_ref();
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("create_new {path:?}"))
}

pub fn remove_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).with_context(|| format!("remove_file {path:?}"))
}
