//! Utility modules for curriculum-import

pub mod db_retry;

pub use db_retry::{retry_on_lock, LockContention};
