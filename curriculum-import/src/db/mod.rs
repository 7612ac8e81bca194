//! Database access for curriculum-import
//!
//! Write-path functions take a `&mut SqliteConnection` so they run inside the
//! caller's transaction; read-path functions take the pool.

pub mod disciplines;
pub mod programs;

pub use disciplines::{DisciplineKey, NewProgramDiscipline};
pub use programs::{ProgramFields, ProgramFilter, ResetSummary};
