//! Data models for curriculum-import

pub mod analysis;
pub mod import_result;
pub mod workbook;

pub use analysis::{CompetencyAnalysis, CompetencyArea, CompetencyReport};
pub use import_result::{BatchReport, ErrorSeverity, FileFailure, ImportOutcome, ImportSummary};
pub use workbook::{DisciplineRow, ParsedWorkbook, ProgramMetadata, RowRecord};
