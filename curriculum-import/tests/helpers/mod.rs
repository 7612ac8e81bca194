//! Test Helper Utilities
//!
//! Shared utilities for testing curriculum-import

#![allow(dead_code)]

pub mod db_utils;
pub mod workbook_builder;

pub use db_utils::{count_rows, create_test_db, create_test_service};
pub use workbook_builder::{TestDiscipline, TestWorkbook};
