//! Curriculum directory walker
//!
//! Finds workbooks under a data directory, infers each one's academic year
//! from a `Fit_<year>` ancestor folder and imports them one by one (or a few
//! at a time). A failing workbook is recorded in the batch report and the
//! run moves on.

use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::models::import_result::{BatchReport, FileFailure};
use crate::services::program_importer::ProgramImporter;
use crate::services::spreadsheet_reader::WorkbookSource;

static YEAR_FOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"Fit_(\d{4})").unwrap());

/// Workbook extensions picked up by the walk
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Directory scan errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// A workbook found by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookFile {
    pub path: PathBuf,
    pub year: Option<i32>,
}

/// Year from the nearest ancestor folder named like `Fit_2023`
pub fn infer_year(path: &Path) -> Option<i32> {
    path.parent()?
        .ancestors()
        .filter_map(|dir| dir.file_name())
        .find_map(|name| {
            let name = name.to_string_lossy();
            YEAR_FOLDER
                .captures(&name)
                .and_then(|caps| caps[1].parse().ok())
        })
}

/// Curriculum workbook scanner
pub struct DirectoryWalker {
    ignore_patterns: Vec<String>,
}

impl Default for DirectoryWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryWalker {
    /// Create a walker with the default pruning rules
    ///
    /// Directories containing `_OLD`, VCS folders and OS metadata are
    /// skipped along with everything under them.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                "_OLD".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
                ".hg".to_string(),
                ".DS_Store".to_string(),
                "__MACOSX".to_string(),
            ],
        }
    }

    /// List workbooks under `root` in path order
    pub fn scan(&self, root: &Path) -> Result<Vec<WorkbookFile>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || self.should_descend(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_workbook(entry.path()) {
                        files.push(WorkbookFile {
                            year: infer_year(entry.path()),
                            path: entry.into_path(),
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(root = %root.display(), workbooks = files.len(), "Scan complete");
        Ok(files)
    }

    fn should_descend(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        let pruned = self.ignore_patterns.iter().any(|p| name.contains(p.as_str()));
        if pruned {
            tracing::debug!(path = %entry.path().display(), "Skipping directory");
        }
        !pruned
    }

    /// Import every workbook under `root`
    ///
    /// Runs up to `jobs` imports at once (at least one). Only an unusable
    /// root is an error; per-file failures land in the report.
    pub async fn import_directory(
        &self,
        importer: &ProgramImporter,
        root: &Path,
        jobs: usize,
    ) -> Result<BatchReport, ScanError> {
        let files = self.scan(root)?;
        let mut report = BatchReport::new(files.len());

        tracing::info!(
            run_id = %report.run_id,
            root = %root.display(),
            workbooks = files.len(),
            jobs,
            "Starting directory import"
        );

        let mut results = stream::iter(files)
            .map(|file| async move {
                let result = importer
                    .import(WorkbookSource::from_path(&file.path), file.year)
                    .await;
                (file, result)
            })
            .buffer_unordered(jobs.max(1));

        while let Some((file, result)) = results.next().await {
            match result {
                Ok(outcome) => report.record_success(&outcome),
                Err(e) => {
                    tracing::error!(
                        path = %file.path.display(),
                        year = file.year,
                        error_code = e.error_code(),
                        "Import failed: {}",
                        e
                    );
                    report.record_failure(FileFailure::from_error(&file.path, &e));
                }
            }
        }

        report.finish();
        tracing::info!(
            run_id = %report.run_id,
            succeeded = report.succeeded,
            created = report.programs_created,
            updated = report.programs_updated,
            failed = report.failed,
            "Directory import finished"
        );
        Ok(report)
    }
}

fn is_workbook(path: &Path) -> bool {
    let starts_with_tilde = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('~'))
        .unwrap_or(true);
    if starts_with_tilde {
        return false;
    }
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            WORKBOOK_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
