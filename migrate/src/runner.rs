//! Walks a source tree and applies the pipeline to every matching file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{FileError, MigrateError};
use crate::rules::Pipeline;

pub const DEFAULT_PATTERNS: &[&str] = &["**/*.jsx", "**/*.tsx"];

#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub root: PathBuf,
    /// Glob patterns relative to `root`.
    pub patterns: Vec<String>,
    /// Report what would change without writing.
    pub dry_run: bool,
}

impl MigrationOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: FileError,
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub scanned: usize,
    pub modified: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// Per-file progress, delivered as the run goes.
#[derive(Debug)]
pub enum Event<'a> {
    Rewritten { path: &'a Path, modified: usize },
    Failed { path: &'a Path, error: &'a FileError },
}

/// Run the pipeline over every file under `options.root` matching one of
/// the patterns. A file is written only when its contents change; files
/// that cannot be read, decoded or written are reported and skipped.
pub fn migrate_tree(
    options: &MigrationOptions,
    pipeline: &Pipeline,
    mut on_event: impl FnMut(Event<'_>),
) -> Result<MigrationReport, MigrateError> {
    if !options.root.is_dir() {
        return Err(MigrateError::MissingRoot(options.root.clone()));
    }

    let root = glob::Pattern::escape(&options.root.to_string_lossy());
    let mut report = MigrationReport::default();

    for pattern in &options.patterns {
        let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
        debug!(pattern = %full, "scanning");

        for entry in glob::glob(&full)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    let path = e.path().to_path_buf();
                    let error = FileError::Read(e.into());
                    warn!(path = %path.display(), %error, "skipping");
                    on_event(Event::Failed { path: &path, error: &error });
                    report.failures.push(FileFailure { path, error });
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            report.scanned += 1;

            match migrate_file(&path, pipeline, options.dry_run) {
                Ok(false) => {}
                Ok(true) => {
                    report.modified.push(path);
                    on_event(Event::Rewritten {
                        path: &report.modified[report.modified.len() - 1],
                        modified: report.modified.len(),
                    });
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping");
                    on_event(Event::Failed { path: &path, error: &error });
                    report.failures.push(FileFailure { path, error });
                }
            }
        }
    }

    info!(
        scanned = report.scanned,
        modified = report.modified.len(),
        failed = report.failures.len(),
        dry_run = options.dry_run,
        "migration finished"
    );
    Ok(report)
}

/// Returns whether the file's contents changed.
pub fn migrate_file(path: &Path, pipeline: &Pipeline, dry_run: bool) -> Result<bool, FileError> {
    let bytes = fs::read(path).map_err(FileError::Read)?;
    let source = String::from_utf8(bytes)?;
    let migrated = pipeline.apply(&source);
    if migrated == source {
        return Ok(false);
    }
    if !dry_run {
        fs::write(path, migrated).map_err(FileError::Write)?;
    }
    debug!(path = %path.display(), dry_run, "rewritten");
    Ok(true)
}
