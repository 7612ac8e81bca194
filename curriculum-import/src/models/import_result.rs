//! Import operation results and failures

use chrono::{DateTime, Utc};
use curriculum_common::db::Program;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::ImportError;

/// Outcome of importing one workbook
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub program: Program,
    /// True when the program row was inserted, false when an existing row
    /// with the same `(direction, profile, year)` was updated
    pub created: bool,
    pub disciplines_created: usize,
    pub disciplines_skipped: usize,
}

/// Caller-facing summary of a single import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub program_id: Uuid,
    pub program: String,
    pub created: bool,
    pub disciplines_created: usize,
    pub disciplines_skipped: usize,
}

impl From<&ImportOutcome> for ImportSummary {
    fn from(outcome: &ImportOutcome) -> Self {
        Self {
            program_id: outcome.program.id,
            program: outcome.program.to_string(),
            created: outcome.created,
            disciplines_created: outcome.disciplines_created,
            disciplines_skipped: outcome.disciplines_skipped,
        }
    }
}

/// Failure severity in a directory run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorSeverity {
    /// Workbook rejected by validation; prior data untouched
    Warning,
    /// Workbook could not be processed (unreadable, database failure)
    Skip,
}

/// One failed workbook in a directory run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    /// File path that caused the error
    pub file_path: String,

    /// Error code (e.g., "PARSE_ERROR", "INVALID_PROGRAM")
    pub error_code: String,

    /// Human-readable error message
    pub error_message: String,

    pub severity: ErrorSeverity,

    pub occurred_at: DateTime<Utc>,
}

impl FileFailure {
    pub fn from_error(file_path: &Path, err: &ImportError) -> Self {
        let severity = match err {
            ImportError::InvalidProgram(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Skip,
        };
        Self {
            file_path: file_path.display().to_string(),
            error_code: err.error_code().to_string(),
            error_message: err.to_string(),
            severity,
            occurred_at: Utc::now(),
        }
    }
}

/// Directory run completion report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Identifies this run in logs
    pub run_id: Uuid,

    /// Workbooks discovered by the walk
    pub total_files: usize,

    /// Workbooks imported without error
    pub succeeded: usize,

    /// Of `succeeded`, how many inserted a new program
    pub programs_created: usize,

    /// Of `succeeded`, how many updated an existing program
    pub programs_updated: usize,

    pub disciplines_created: usize,

    /// Workbooks that failed; the run continued past each of them
    pub failed: usize,

    pub failures: Vec<FileFailure>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn new(total_files: usize) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            total_files,
            succeeded: 0,
            programs_created: 0,
            programs_updated: 0,
            disciplines_created: 0,
            failed: 0,
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn record_success(&mut self, outcome: &ImportOutcome) {
        self.succeeded += 1;
        if outcome.created {
            self.programs_created += 1;
        } else {
            self.programs_updated += 1;
        }
        self.disciplines_created += outcome.disciplines_created;
    }

    pub fn record_failure(&mut self, failure: FileFailure) {
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Count failures by severity
    pub fn count_by_severity(&self, severity: ErrorSeverity) -> usize {
        self.failures.iter().filter(|f| f.severity == severity).count()
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_program_is_a_warning() {
        let failure = FileFailure::from_error(
            Path::new("/data/Fit_2023/plan.xlsx"),
            &ImportError::InvalidProgram("Profile cannot be empty".to_string()),
        );
        assert_eq!(failure.severity, ErrorSeverity::Warning);
        assert_eq!(failure.error_code, "INVALID_PROGRAM");
        assert_eq!(failure.file_path, "/data/Fit_2023/plan.xlsx");
    }

    #[test]
    fn test_parse_error_is_a_skip() {
        let failure = FileFailure::from_error(
            Path::new("broken.xlsx"),
            &ImportError::Parse {
                path: "broken.xlsx".to_string(),
                message: "not a zip archive".to_string(),
            },
        );
        assert_eq!(failure.severity, ErrorSeverity::Skip);

        let mut report = BatchReport::new(3);
        report.record_failure(failure);
        assert_eq!(report.failed, 1);
        assert_eq!(report.count_by_severity(ErrorSeverity::Skip), 1);
        assert_eq!(report.count_by_severity(ErrorSeverity::Warning), 0);
    }
}
