use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Failures that stop a run before any file is touched.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("root directory does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Failure on a single file. The run records it and moves on.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}
