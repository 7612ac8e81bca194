//! Database models
//!
//! Identifiers are stored as hyphenated UUID text (`guid TEXT PRIMARY KEY`)
//! and converted at the row boundary.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;
use uuid::Uuid;

/// Controlled-vocabulary tables keyed by a unique `name`
///
/// Direction is not listed here: it is keyed by `code`, not `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryKind {
    Faculty,
    EducationLevel,
    EducationType,
    Qualification,
    StandardType,
    Semester,
    DisciplineBlock,
    DisciplinePart,
    DisciplineModule,
    LoadType,
    DisciplineCatalog,
}

impl DictionaryKind {
    pub const ALL: [DictionaryKind; 11] = [
        DictionaryKind::Faculty,
        DictionaryKind::EducationLevel,
        DictionaryKind::EducationType,
        DictionaryKind::Qualification,
        DictionaryKind::StandardType,
        DictionaryKind::Semester,
        DictionaryKind::DisciplineBlock,
        DictionaryKind::DisciplinePart,
        DictionaryKind::DisciplineModule,
        DictionaryKind::LoadType,
        DictionaryKind::DisciplineCatalog,
    ];

    /// Backing table name
    pub fn table(self) -> &'static str {
        match self {
            DictionaryKind::Faculty => "faculties",
            DictionaryKind::EducationLevel => "education_levels",
            DictionaryKind::EducationType => "education_types",
            DictionaryKind::Qualification => "qualifications",
            DictionaryKind::StandardType => "standard_types",
            DictionaryKind::Semester => "semesters",
            DictionaryKind::DisciplineBlock => "discipline_blocks",
            DictionaryKind::DisciplinePart => "discipline_parts",
            DictionaryKind::DisciplineModule => "discipline_modules",
            DictionaryKind::LoadType => "load_types",
            DictionaryKind::DisciplineCatalog => "discipline_catalog",
        }
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Parse a stored guid column
pub fn parse_guid(value: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn get_guid(row: &SqliteRow, column: &str) -> Result<Uuid, sqlx::Error> {
    let value: String = row.try_get(column)?;
    parse_guid(&value)
}

fn get_opt_guid(row: &SqliteRow, column: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let value: Option<String> = row.try_get(column)?;
    value.as_deref().map(parse_guid).transpose()
}

/// Academic program, unique by `(direction, profile, year)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub education_type_id: Option<Uuid>,
    pub education_level_id: Option<Uuid>,
    pub direction_id: Option<Uuid>,
    pub qualification_id: Option<Uuid>,
    pub standard_type_id: Option<Uuid>,
    pub faculty_id: Option<Uuid>,
    pub profile: String,
    pub year: Option<i32>,
}

impl<'r> FromRow<'r, SqliteRow> for Program {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_guid(row, "guid")?,
            education_type_id: get_opt_guid(row, "education_type_id")?,
            education_level_id: get_opt_guid(row, "education_level_id")?,
            direction_id: get_opt_guid(row, "direction_id")?,
            qualification_id: get_opt_guid(row, "qualification_id")?,
            standard_type_id: get_opt_guid(row, "standard_type_id")?,
            faculty_id: get_opt_guid(row, "faculty_id")?,
            profile: row.try_get("profile")?,
            year: row.try_get("year")?,
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.profile, year),
            None => write!(f, "{}", self.profile),
        }
    }
}

/// Program row with every reference resolved to its display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub id: Uuid,
    pub profile: String,
    pub year: Option<i32>,
    pub direction_code: Option<String>,
    pub direction_name: Option<String>,
    pub faculty: Option<String>,
    pub education_level: Option<String>,
    pub education_type: Option<String>,
    pub qualification: Option<String>,
    pub standard_type: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for ProgramSummary {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_guid(row, "guid")?,
            profile: row.try_get("profile")?,
            year: row.try_get("year")?,
            direction_code: row.try_get("direction_code")?,
            direction_name: row.try_get("direction_name")?,
            faculty: row.try_get("faculty")?,
            education_level: row.try_get("education_level")?,
            education_type: row.try_get("education_type")?,
            qualification: row.try_get("qualification")?,
            standard_type: row.try_get("standard_type")?,
        })
    }
}

impl fmt::Display for ProgramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.direction_code {
            write!(f, "{} ", code)?;
        }
        f.write_str(&self.profile)?;
        if let Some(year) = self.year {
            write!(f, " ({})", year)?;
        }
        Ok(())
    }
}

/// Program discipline with dictionary references resolved to names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDisciplineDetail {
    pub id: Uuid,
    pub discipline: String,
    pub semester: Option<String>,
    pub block: Option<String>,
    pub part: Option<String>,
    pub module: Option<String>,
    pub load_type: Option<String>,
    pub code: Option<String>,
    pub amount: Option<String>,
    pub measurement_unit: Option<String>,
    pub zet: Option<String>,
}

impl ProgramDisciplineDetail {
    /// Minimal detail carrying only what credit analysis reads
    pub fn named(discipline: impl Into<String>, zet: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            discipline: discipline.into(),
            semester: None,
            block: None,
            part: None,
            module: None,
            load_type: None,
            code: None,
            amount: None,
            measurement_unit: None,
            zet: zet.map(str::to_string),
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for ProgramDisciplineDetail {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_guid(row, "guid")?,
            discipline: row.try_get("discipline")?,
            semester: row.try_get("semester")?,
            block: row.try_get("block")?,
            part: row.try_get("part")?,
            module: row.try_get("module")?,
            load_type: row.try_get("load_type")?,
            code: row.try_get("code")?,
            amount: row.try_get("amount")?,
            measurement_unit: row.try_get("measurement_unit")?,
            zet: row.try_get("zet")?,
        })
    }
}
