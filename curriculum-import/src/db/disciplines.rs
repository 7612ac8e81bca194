//! Program discipline persistence

use curriculum_common::db::ProgramDisciplineDetail;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::ImportResult;

/// Dedup key of a discipline inside one program:
/// `(semester name, discipline name, code)`
pub type DisciplineKey = (Option<String>, String, Option<String>);

/// Columns bound per staged row
const COLUMNS_PER_ROW: usize = 12;

/// SQLite's historical default for host parameters per statement
const MAX_BIND_PARAMS: usize = 999;

const ROWS_PER_INSERT: usize = MAX_BIND_PARAMS / COLUMNS_PER_ROW;

/// A discipline row resolved to dictionary ids, ready for insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgramDiscipline {
    pub discipline_id: Uuid,
    pub semester_id: Option<Uuid>,
    pub block_id: Option<Uuid>,
    pub part_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub load_type_id: Option<Uuid>,
    pub code: Option<String>,
    pub amount: Option<String>,
    pub measurement_unit: Option<String>,
    pub zet: Option<String>,
}

/// Keys of the disciplines a program already has
pub async fn existing_keys(
    conn: &mut SqliteConnection,
    program_id: Uuid,
) -> ImportResult<HashSet<DisciplineKey>> {
    let rows = sqlx::query(
        r#"
        SELECT s.name AS semester, dc.name AS discipline, pd.code
        FROM program_disciplines pd
        JOIN discipline_catalog dc ON dc.guid = pd.discipline_id
        LEFT JOIN semesters s ON s.guid = pd.semester_id
        WHERE pd.program_id = ?
        "#,
    )
    .bind(program_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| -> ImportResult<DisciplineKey> {
            Ok((
                row.try_get("semester")?,
                row.try_get("discipline")?,
                row.try_get("code")?,
            ))
        })
        .collect()
}

/// Insert staged disciplines with multi-row statements
///
/// Returns the number of rows inserted.
pub async fn insert_batch(
    conn: &mut SqliteConnection,
    program_id: Uuid,
    rows: &[NewProgramDiscipline],
) -> ImportResult<usize> {
    let mut inserted = 0usize;

    for chunk in rows.chunks(ROWS_PER_INSERT) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO program_disciplines (guid, program_id, discipline_id, semester_id, \
             block_id, part_id, module_id, load_type_id, code, amount, measurement_unit, zet) ",
        );
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(Uuid::new_v4().to_string())
                .push_bind(program_id.to_string())
                .push_bind(row.discipline_id.to_string())
                .push_bind(row.semester_id.map(|id| id.to_string()))
                .push_bind(row.block_id.map(|id| id.to_string()))
                .push_bind(row.part_id.map(|id| id.to_string()))
                .push_bind(row.module_id.map(|id| id.to_string()))
                .push_bind(row.load_type_id.map(|id| id.to_string()))
                .push_bind(row.code.clone())
                .push_bind(row.amount.clone())
                .push_bind(row.measurement_unit.clone())
                .push_bind(row.zet.clone());
        });

        let result = builder.build().execute(&mut *conn).await?;
        inserted += result.rows_affected() as usize;
    }

    Ok(inserted)
}

/// A program's disciplines with names resolved, in insertion order
pub async fn load_details(
    pool: &SqlitePool,
    program_id: Uuid,
) -> ImportResult<Vec<ProgramDisciplineDetail>> {
    let details = sqlx::query_as::<_, ProgramDisciplineDetail>(
        r#"
        SELECT pd.guid, dc.name AS discipline, s.name AS semester,
               b.name AS block, pt.name AS part, m.name AS module,
               lt.name AS load_type, pd.code, pd.amount,
               pd.measurement_unit, pd.zet
        FROM program_disciplines pd
        JOIN discipline_catalog dc ON dc.guid = pd.discipline_id
        LEFT JOIN semesters s ON s.guid = pd.semester_id
        LEFT JOIN discipline_blocks b ON b.guid = pd.block_id
        LEFT JOIN discipline_parts pt ON pt.guid = pd.part_id
        LEFT JOIN discipline_modules m ON m.guid = pd.module_id
        LEFT JOIN load_types lt ON lt.guid = pd.load_type_id
        WHERE pd.program_id = ?
        ORDER BY pd.rowid
        "#,
    )
    .bind(program_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(details)
}
