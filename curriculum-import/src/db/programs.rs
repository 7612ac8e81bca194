//! Program persistence
//!
//! A program is identified by `(direction, profile, year)` where direction
//! and year may be NULL. Lookups use `IS` so NULL matches NULL, mirroring
//! the IFNULL unique index.

use curriculum_common::db::{DictionaryKind, Program, ProgramSummary};
use curriculum_common::error::is_unique_violation;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::ImportResult;

/// Column values for inserting or updating a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramFields {
    pub education_type_id: Option<Uuid>,
    pub education_level_id: Option<Uuid>,
    pub direction_id: Option<Uuid>,
    pub qualification_id: Option<Uuid>,
    pub standard_type_id: Option<Uuid>,
    pub faculty_id: Option<Uuid>,
    pub profile: String,
    pub year: Option<i32>,
}

impl ProgramFields {
    fn into_program(self, id: Uuid) -> Program {
        Program {
            id,
            education_type_id: self.education_type_id,
            education_level_id: self.education_level_id,
            direction_id: self.direction_id,
            qualification_id: self.qualification_id,
            standard_type_id: self.standard_type_id,
            faculty_id: self.faculty_id,
            profile: self.profile,
            year: self.year,
        }
    }
}

fn opt_guid(id: Option<Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

/// Find a program id by its identity triple
pub async fn find_program_id(
    conn: &mut SqliteConnection,
    direction_id: Option<Uuid>,
    profile: &str,
    year: Option<i32>,
) -> ImportResult<Option<Uuid>> {
    let row = sqlx::query(
        "SELECT guid FROM programs WHERE direction_id IS ? AND profile = ? AND year IS ?",
    )
    .bind(opt_guid(direction_id))
    .bind(profile)
    .bind(year)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let guid: String = row.try_get("guid")?;
            Ok(Some(curriculum_common::db::parse_guid(&guid)?))
        }
        None => Ok(None),
    }
}

async fn update_program(
    conn: &mut SqliteConnection,
    id: Uuid,
    fields: &ProgramFields,
) -> ImportResult<()> {
    sqlx::query(
        r#"
        UPDATE programs SET
            education_type_id = ?,
            education_level_id = ?,
            qualification_id = ?,
            standard_type_id = ?,
            faculty_id = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(opt_guid(fields.education_type_id))
    .bind(opt_guid(fields.education_level_id))
    .bind(opt_guid(fields.qualification_id))
    .bind(opt_guid(fields.standard_type_id))
    .bind(opt_guid(fields.faculty_id))
    .bind(id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Insert the program or update the existing one with the same identity
///
/// Returns the stored program and whether it was created. A concurrent
/// insert of the same identity surfaces as a unique violation; the winner is
/// then read back and updated.
pub async fn upsert_program(
    conn: &mut SqliteConnection,
    fields: ProgramFields,
) -> ImportResult<(Program, bool)> {
    if let Some(id) =
        find_program_id(conn, fields.direction_id, &fields.profile, fields.year).await?
    {
        update_program(conn, id, &fields).await?;
        return Ok((fields.into_program(id), false));
    }

    let id = Uuid::new_v4();
    let inserted = sqlx::query(
        r#"
        INSERT INTO programs (
            guid, education_type_id, education_level_id, direction_id,
            qualification_id, standard_type_id, faculty_id, profile, year
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(opt_guid(fields.education_type_id))
    .bind(opt_guid(fields.education_level_id))
    .bind(opt_guid(fields.direction_id))
    .bind(opt_guid(fields.qualification_id))
    .bind(opt_guid(fields.standard_type_id))
    .bind(opt_guid(fields.faculty_id))
    .bind(&fields.profile)
    .bind(fields.year)
    .execute(&mut *conn)
    .await;

    match inserted {
        Ok(_) => Ok((fields.into_program(id), true)),
        Err(e) if is_unique_violation(&e) => {
            let existing =
                find_program_id(conn, fields.direction_id, &fields.profile, fields.year)
                    .await?
                    .ok_or(e)?;
            tracing::debug!(program_id = %existing, "Lost program insert race, updating winner");
            update_program(conn, existing, &fields).await?;
            Ok((fields.into_program(existing), false))
        }
        Err(e) => Err(e.into()),
    }
}

/// Load one program row
pub async fn load_program(pool: &SqlitePool, id: Uuid) -> ImportResult<Option<Program>> {
    let program = sqlx::query_as::<_, Program>(
        r#"
        SELECT guid, education_type_id, education_level_id, direction_id,
               qualification_id, standard_type_id, faculty_id, profile, year
        FROM programs
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(program)
}

const SUMMARY_SELECT: &str = r#"
    SELECT p.guid, p.profile, p.year,
           d.code AS direction_code, d.name AS direction_name,
           f.name AS faculty, el.name AS education_level,
           et.name AS education_type, q.name AS qualification,
           st.name AS standard_type
    FROM programs p
    LEFT JOIN directions d ON d.guid = p.direction_id
    LEFT JOIN faculties f ON f.guid = p.faculty_id
    LEFT JOIN education_levels el ON el.guid = p.education_level_id
    LEFT JOIN education_types et ON et.guid = p.education_type_id
    LEFT JOIN qualifications q ON q.guid = p.qualification_id
    LEFT JOIN standard_types st ON st.guid = p.standard_type_id
"#;

/// Load one program with its references resolved to names
pub async fn load_program_summary(
    pool: &SqlitePool,
    id: Uuid,
) -> ImportResult<Option<ProgramSummary>> {
    let query = format!("{SUMMARY_SELECT} WHERE p.guid = ?");
    let summary = sqlx::query_as::<_, ProgramSummary>(&query)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(summary)
}

/// Program list filter; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFilter {
    pub year: Option<i32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    /// Case-insensitive exact faculty name
    pub faculty: Option<String>,
    /// Case-insensitive exact education level name
    pub education_level: Option<String>,
}

fn matches_ignoring_case(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => value.is_some_and(|v| v.to_lowercase() == wanted.trim().to_lowercase()),
    }
}

/// List programs, newest year first
///
/// Year bounds are applied in SQL. Name filters are compared in Rust since
/// SQLite's `LOWER` only folds ASCII and faculty names are Cyrillic.
pub async fn list_programs(
    pool: &SqlitePool,
    filter: &ProgramFilter,
) -> ImportResult<Vec<ProgramSummary>> {
    let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(SUMMARY_SELECT);
    builder.push(" WHERE 1 = 1");
    if let Some(year) = filter.year {
        builder.push(" AND p.year = ").push_bind(year);
    }
    if let Some(from) = filter.year_from {
        builder.push(" AND p.year >= ").push_bind(from);
    }
    if let Some(to) = filter.year_to {
        builder.push(" AND p.year <= ").push_bind(to);
    }
    builder.push(" ORDER BY p.year DESC, p.profile");

    let programs = builder
        .build_query_as::<ProgramSummary>()
        .fetch_all(pool)
        .await?;

    Ok(programs
        .into_iter()
        .filter(|p| matches_ignoring_case(p.faculty.as_deref(), filter.faculty.as_deref()))
        .filter(|p| {
            matches_ignoring_case(p.education_level.as_deref(), filter.education_level.as_deref())
        })
        .collect())
}

/// Rows removed by [`reset_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub programs: u64,
    pub program_disciplines: u64,
    pub directions: u64,
    pub dictionary_rows: u64,
}

/// Delete every program, discipline and dictionary row in one transaction
pub async fn reset_all(pool: &SqlitePool) -> ImportResult<ResetSummary> {
    let mut tx = pool.begin().await?;
    let mut summary = ResetSummary::default();

    summary.program_disciplines = sqlx::query("DELETE FROM program_disciplines")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    summary.programs = sqlx::query("DELETE FROM programs")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    summary.directions = sqlx::query("DELETE FROM directions")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    for kind in DictionaryKind::ALL {
        let sql = format!("DELETE FROM {}", kind.table());
        summary.dictionary_rows += sqlx::query(&sql).execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    tracing::info!(
        programs = summary.programs,
        program_disciplines = summary.program_disciplines,
        dictionary_rows = summary.dictionary_rows + summary.directions,
        "Curriculum data reset"
    );
    Ok(summary)
}
