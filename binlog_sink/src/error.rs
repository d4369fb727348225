use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why [`crate::FileSink::configure`] failed. The previous configuration stays active.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("File Logger fails to open file, {}: {source}", .path.display())]
    CantOpenFile { path: PathBuf, source: io::Error },

    #[error("File Logger fails to write file, {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ConfigurationError {
    pub(crate) fn cant_open_file(path: impl Into<PathBuf>, e: anyhow::Error) -> Self {
        Self::CantOpenFile {
            path: path.into(),
            source: into_io_error(e),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, e: anyhow::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: into_io_error(e),
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::CantOpenFile { .. } => "CantOpenFile",
            Self::Io { .. } => "IOError",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::CantOpenFile { path, .. } | Self::Io { path, .. } => path,
        }
    }

    pub fn description(&self) -> String {
        format!("BinLog {}, \"{self}\"", self.category())
    }
}

fn into_io_error(e: anyhow::Error) -> io::Error {
    match e.downcast::<io::Error>() {
        Ok(io_e) => io_e,
        Err(e) => io::Error::new(ErrorKind::Other, format!("{e:#}")),
    }
}
