//! Database Test Utilities

use curriculum_common::db::init_database;
use curriculum_import::CurriculumService;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create a temporary database with the full schema
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("test_curriculum.db"))
        .await
        .unwrap();
    (temp_dir, pool)
}

/// Service over a fresh temporary database
pub async fn create_test_service() -> (TempDir, CurriculumService) {
    let (temp_dir, pool) = create_test_db().await;
    (temp_dir, CurriculumService::new(pool))
}

/// Row count of a table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
