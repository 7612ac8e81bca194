//! Get-or-create resolution of dictionary rows
//!
//! One resolver lives for one import attempt. Its cache maps names already
//! seen in that attempt to their guids, so a workbook with hundreds of rows
//! naming the same semester touches the table once.
//!
//! Creation is a single `INSERT ... ON CONFLICT DO NOTHING RETURNING guid`.
//! An empty result means another writer owns the name, and the existing row
//! is read back. The insert runs before any read so the connection takes the
//! SQLite write lock at its first statement.

use curriculum_common::db::{parse_guid, DictionaryKind};
use curriculum_common::error::is_unique_violation;
use sqlx::{Row, SqliteConnection};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ImportResult;

#[derive(Debug, Default)]
pub struct DictionaryResolver {
    cache: HashMap<(DictionaryKind, String), Uuid>,
    directions: HashMap<String, Uuid>,
    created: usize,
}

impl DictionaryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows this resolver inserted (not found existing)
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Resolve `name` in the `kind` table, creating it on first sight
    ///
    /// Absent or blank names resolve to `None`.
    pub async fn get_or_create(
        &mut self,
        conn: &mut SqliteConnection,
        kind: DictionaryKind,
        name: Option<&str>,
    ) -> ImportResult<Option<Uuid>> {
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => return Ok(None),
        };

        let key = (kind, name.to_string());
        if let Some(id) = self.cache.get(&key) {
            return Ok(Some(*id));
        }

        let table = kind.table();
        let insert = format!(
            "INSERT INTO {table} (guid, name) VALUES (?, ?) \
             ON CONFLICT(name) DO NOTHING RETURNING guid"
        );
        let inserted = sqlx::query(&insert)
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .fetch_optional(&mut *conn)
            .await;

        let id = match inserted {
            Ok(Some(row)) => {
                self.created += 1;
                let id = parse_guid(row.try_get::<&str, _>("guid")?)?;
                tracing::debug!(table, name, %id, "Created dictionary entry");
                id
            }
            Ok(None) => self.select_by_name(conn, table, name).await?,
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(table, name, "Lost insert race, reading existing entry");
                self.select_by_name(conn, table, name).await?
            }
            Err(e) => return Err(e.into()),
        };

        self.cache.insert(key, id);
        Ok(Some(id))
    }

    async fn select_by_name(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
        name: &str,
    ) -> ImportResult<Uuid> {
        let query = format!("SELECT guid FROM {table} WHERE name = ?");
        let row = sqlx::query(&query).bind(name).fetch_one(&mut *conn).await?;
        Ok(parse_guid(row.try_get::<&str, _>("guid")?)?)
    }

    /// Resolve a direction by code
    ///
    /// The first writer's name is kept; a later import naming the same code
    /// differently does not rename it. An empty code resolves to `None`.
    pub async fn get_or_create_direction(
        &mut self,
        conn: &mut SqliteConnection,
        code: &str,
        name: &str,
    ) -> ImportResult<Option<Uuid>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        if let Some(id) = self.directions.get(code) {
            return Ok(Some(*id));
        }

        let inserted = sqlx::query(
            "INSERT INTO directions (guid, code, name) VALUES (?, ?, ?) \
             ON CONFLICT(code) DO NOTHING RETURNING guid",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(code)
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await;

        let id = match inserted {
            Ok(Some(row)) => {
                self.created += 1;
                let id = parse_guid(row.try_get::<&str, _>("guid")?)?;
                tracing::debug!(code, name, %id, "Created direction");
                id
            }
            Ok(None) => select_direction(conn, code).await?,
            Err(e) if is_unique_violation(&e) => select_direction(conn, code).await?,
            Err(e) => return Err(e.into()),
        };

        self.directions.insert(code.to_string(), id);
        Ok(Some(id))
    }
}

async fn select_direction(conn: &mut SqliteConnection, code: &str) -> ImportResult<Uuid> {
    let row = sqlx::query("SELECT guid FROM directions WHERE code = ?")
        .bind(code)
        .fetch_one(&mut *conn)
        .await?;
    Ok(parse_guid(row.try_get::<&str, _>("guid")?)?)
}
