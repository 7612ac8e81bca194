//! curriculum-import library interface
//!
//! Spreadsheet import pipeline for academic curricula and the competency
//! analysis over what it stores. The binary in `main.rs` is a thin CLI over
//! [`CurriculumService`].

pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod services;
pub mod utils;

pub use crate::error::{ImportError, ImportResult};
pub use crate::service::{CurriculumService, ProgramDetail};
pub use crate::services::WorkbookSource;
