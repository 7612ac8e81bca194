//! # Curriculum Common Library
//!
//! Shared code for the curriculum import workspace:
//! - Database pool initialization and schema
//! - Row models and dictionary table mapping
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
