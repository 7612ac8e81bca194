//! Database initialization
//!
//! Opens (or creates) the SQLite store and creates every table and index
//! idempotently. Safe to call on every startup.

use crate::db::models::DictionaryKind;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// SQLite busy timeout applied to every pooled connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys and busy timeout are per-connection settings, so they go
    // on the connect options rather than a one-off PRAGMA.
    // WAL lets readers proceed while a directory run holds the writer.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all curriculum tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for kind in DictionaryKind::ALL {
        create_dictionary_table(pool, kind).await?;
    }
    create_directions_table(pool).await?;
    create_programs_table(pool).await?;
    create_program_disciplines_table(pool).await?;

    Ok(())
}

/// Create one `{guid, name UNIQUE}` dictionary table
async fn create_dictionary_table(pool: &SqlitePool, kind: DictionaryKind) -> Result<()> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        table = kind.table()
    );
    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

async fn create_directions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS directions (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the programs table
///
/// Identity is `(direction, profile, year)`. NULL direction or year must
/// still collide with another NULL, so the unique index is built on
/// IFNULL expressions instead of the raw columns.
pub async fn create_programs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            guid TEXT PRIMARY KEY,
            education_type_id TEXT REFERENCES education_types(guid),
            education_level_id TEXT REFERENCES education_levels(guid),
            direction_id TEXT REFERENCES directions(guid),
            qualification_id TEXT REFERENCES qualifications(guid),
            standard_type_id TEXT REFERENCES standard_types(guid),
            faculty_id TEXT REFERENCES faculties(guid),
            profile TEXT NOT NULL,
            year INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_programs_identity \
         ON programs(IFNULL(direction_id, ''), profile, IFNULL(year, -1))",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_programs_year ON programs(year)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the program_disciplines table
///
/// Dedup key inside a program is `(semester, discipline, code)`; semester
/// and discipline names map 1:1 onto their guids, so the index uses ids.
pub async fn create_program_disciplines_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS program_disciplines (
            guid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL REFERENCES programs(guid) ON DELETE CASCADE,
            discipline_id TEXT NOT NULL REFERENCES discipline_catalog(guid),
            semester_id TEXT REFERENCES semesters(guid),
            block_id TEXT REFERENCES discipline_blocks(guid),
            part_id TEXT REFERENCES discipline_parts(guid),
            module_id TEXT REFERENCES discipline_modules(guid),
            load_type_id TEXT REFERENCES load_types(guid),
            code TEXT,
            amount TEXT,
            measurement_unit TEXT,
            zet TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_program_disciplines_key \
         ON program_disciplines(program_id, IFNULL(semester_id, ''), discipline_id, IFNULL(code, ''))",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_program_disciplines_discipline \
         ON program_disciplines(discipline_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
