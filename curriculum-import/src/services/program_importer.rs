//! Single-workbook import
//!
//! A workbook becomes one program plus its disciplines. The workbook is
//! parsed on a blocking worker, then every write for the file (dictionary
//! rows, the program upsert and the discipline batch) runs in one
//! transaction. Lock contention retries the whole transaction.

use curriculum_common::db::DictionaryKind;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::{disciplines, programs, NewProgramDiscipline, ProgramFields};
use crate::error::{ImportError, ImportResult};
use crate::models::import_result::ImportOutcome;
use crate::models::workbook::{DisciplineRow, ParsedWorkbook, ProgramMetadata};
use crate::services::dictionary_resolver::DictionaryResolver;
use crate::services::direction_code;
use crate::services::spreadsheet_reader::{self, WorkbookSource};
use crate::utils::retry_on_lock;

/// Spreadsheet libraries render unfilled numeric cells as this text
const NAN_PLACEHOLDER: &str = "nan";

/// Check the profile cell and return it trimmed
///
/// Absent, blank and `nan` (any case) profiles are rejected.
pub fn validate_profile(profile: Option<&str>) -> ImportResult<String> {
    let profile = profile.map(str::trim).unwrap_or_default();
    if profile.is_empty() {
        return Err(ImportError::InvalidProgram(
            "profile (specialization) is empty".to_string(),
        ));
    }
    if profile.eq_ignore_ascii_case(NAN_PLACEHOLDER) {
        return Err(ImportError::InvalidProgram(format!(
            "profile (specialization) is a placeholder: {profile}"
        )));
    }
    Ok(profile.to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Read both sheets, rejecting the workbook before the second pass when the
/// profile is invalid
fn read_validated(mut source: WorkbookSource) -> ImportResult<(ParsedWorkbook, String)> {
    let metadata =
        ProgramMetadata::from_map(&spreadsheet_reader::read_program_metadata(&mut source)?);
    let profile = validate_profile(metadata.profile.as_deref())?;

    let disciplines = spreadsheet_reader::read_discipline_rows(&mut source)?
        .iter()
        .map(DisciplineRow::from_record)
        .collect();

    Ok((
        ParsedWorkbook {
            metadata,
            disciplines,
        },
        profile,
    ))
}

/// Imports curriculum workbooks into the store
#[derive(Debug, Clone)]
pub struct ProgramImporter {
    pool: SqlitePool,
    max_lock_wait_ms: u64,
}

impl ProgramImporter {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_lock_wait_ms: curriculum_common::config::ImportConfig::default().max_lock_wait_ms,
        }
    }

    /// Bound on retrying a transaction that hit lock contention
    pub fn with_max_lock_wait_ms(mut self, max_lock_wait_ms: u64) -> Self {
        self.max_lock_wait_ms = max_lock_wait_ms;
        self
    }

    /// Import one workbook as the program for `year`
    ///
    /// Re-importing a workbook updates the program's references and adds only
    /// disciplines not already present. On any error nothing from this file
    /// is persisted.
    pub async fn import(
        &self,
        source: WorkbookSource,
        year: Option<i32>,
    ) -> ImportResult<ImportOutcome> {
        let source_name = source.name();

        let (workbook, profile) = tokio::task::spawn_blocking(move || read_validated(source))
            .await
            .map_err(|e| ImportError::Internal(format!("Workbook reader task failed: {e}")))??;

        tracing::debug!(
            source = %source_name,
            aup_number = workbook.metadata.aup_number.as_deref().unwrap_or("-"),
            rows = workbook.disciplines.len(),
            "Parsed workbook"
        );

        let workbook = &workbook;
        let profile = profile.as_str();
        let outcome = retry_on_lock("program import", self.max_lock_wait_ms, move || {
            self.persist(workbook, profile, year)
        })
        .await?;

        tracing::info!(
            source = %source_name,
            program = %outcome.program,
            program_id = %outcome.program.id,
            created = outcome.created,
            disciplines_created = outcome.disciplines_created,
            disciplines_skipped = outcome.disciplines_skipped,
            "Imported program"
        );

        Ok(outcome)
    }

    /// One transactional attempt
    async fn persist(
        &self,
        workbook: &ParsedWorkbook,
        profile: &str,
        year: Option<i32>,
    ) -> ImportResult<ImportOutcome> {
        let mut tx = self.pool.begin().await?;
        let mut resolver = DictionaryResolver::new();
        let metadata = &workbook.metadata;

        let (code, name) = direction_code::extract(
            metadata.direction_code.as_deref(),
            metadata.direction.as_deref(),
        );
        let direction_id = resolver
            .get_or_create_direction(&mut tx, &code, &name)
            .await?;

        let fields = ProgramFields {
            education_type_id: resolver
                .get_or_create(&mut tx, DictionaryKind::EducationType, metadata.education_type.as_deref())
                .await?,
            education_level_id: resolver
                .get_or_create(&mut tx, DictionaryKind::EducationLevel, metadata.education_level.as_deref())
                .await?,
            direction_id,
            qualification_id: resolver
                .get_or_create(&mut tx, DictionaryKind::Qualification, metadata.qualification.as_deref())
                .await?,
            standard_type_id: resolver
                .get_or_create(&mut tx, DictionaryKind::StandardType, metadata.standard_type.as_deref())
                .await?,
            faculty_id: resolver
                .get_or_create(&mut tx, DictionaryKind::Faculty, metadata.faculty.as_deref())
                .await?,
            profile: profile.to_string(),
            year,
        };

        let (program, created) = programs::upsert_program(&mut tx, fields).await?;

        let (staged, skipped) =
            stage_disciplines(&mut tx, &mut resolver, program.id, &workbook.disciplines).await?;
        let inserted = disciplines::insert_batch(&mut tx, program.id, &staged).await?;

        tx.commit().await?;

        tracing::debug!(
            program_id = %program.id,
            dictionary_rows_created = resolver.created_count(),
            "Import transaction committed"
        );

        Ok(ImportOutcome {
            program,
            created,
            disciplines_created: inserted,
            disciplines_skipped: skipped,
        })
    }
}

/// Resolve discipline rows and drop those already present
///
/// Returns the rows to insert and how many were duplicates, either of an
/// existing discipline of the program or of an earlier row in the workbook.
/// Rows without a discipline name are ignored entirely.
async fn stage_disciplines(
    conn: &mut SqliteConnection,
    resolver: &mut DictionaryResolver,
    program_id: Uuid,
    rows: &[DisciplineRow],
) -> ImportResult<(Vec<NewProgramDiscipline>, usize)> {
    let mut seen = disciplines::existing_keys(conn, program_id).await?;
    let mut staged = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        let Some(name) = row.discipline_name() else {
            continue;
        };
        let Some(discipline_id) = resolver
            .get_or_create(conn, DictionaryKind::DisciplineCatalog, Some(name))
            .await?
        else {
            continue;
        };

        let semester = non_blank(row.period.as_deref());
        let semester_id = resolver
            .get_or_create(conn, DictionaryKind::Semester, semester)
            .await?;
        let block_id = resolver
            .get_or_create(conn, DictionaryKind::DisciplineBlock, row.block.as_deref())
            .await?;
        let part_id = resolver
            .get_or_create(conn, DictionaryKind::DisciplinePart, row.part.as_deref())
            .await?;
        let module_id = resolver
            .get_or_create(conn, DictionaryKind::DisciplineModule, row.module.as_deref())
            .await?;
        let load_type_id = resolver
            .get_or_create(conn, DictionaryKind::LoadType, row.load_type.as_deref())
            .await?;

        let code = non_blank(row.code.as_deref()).map(str::to_string);
        let key = (semester.map(str::to_string), name.to_string(), code.clone());
        if !seen.insert(key) {
            skipped += 1;
            continue;
        }

        staged.push(NewProgramDiscipline {
            discipline_id,
            semester_id,
            block_id,
            part_id,
            module_id,
            load_type_id,
            code,
            amount: non_blank(row.amount.as_deref()).map(str::to_string),
            measurement_unit: non_blank(row.measurement_unit.as_deref()).map(str::to_string),
            zet: non_blank(row.zet.as_deref()).map(str::to_string),
        });
    }

    Ok((staged, skipped))
}
