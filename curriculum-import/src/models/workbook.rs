//! Raw workbook content
//!
//! Sheet 1 is a two-column label → value list describing the program.
//! Sheet 2 is a table of discipline entries with a header row.

use std::collections::HashMap;

pub const PROGRAM_SHEET_INDEX: usize = 0;
pub const DISCIPLINES_SHEET_INDEX: usize = 1;

// Sheet 1 labels
pub const COL_AUP_NUMBER: &str = "Номер АУП";
pub const COL_EDUCATION_TYPE: &str = "Вид образования";
pub const COL_EDUCATION_LEVEL: &str = "Уровень образования";
pub const COL_DIRECTION: &str = "Направление (специальность)";
pub const COL_DIRECTION_CODE: &str = "Код специальности";
pub const COL_QUALIFICATION: &str = "Квалификация";
pub const COL_PROFILE: &str = "Профиль (специализация)";
pub const COL_STANDARD_TYPE: &str = "Тип стандарта";
pub const COL_FACULTY: &str = "Факультет";

// Sheet 2 headers
pub const COL_BLOCK: &str = "Блок";
pub const COL_CODE: &str = "Шифр";
pub const COL_PART: &str = "Часть";
pub const COL_MODULE: &str = "Модуль";
pub const COL_RECORD_TYPE: &str = "Тип записи";
pub const COL_DISCIPLINE_NAME: &str = "Дисциплина";
pub const COL_PERIOD: &str = "Период контроля";
pub const COL_LOAD_TYPE: &str = "Нагрузка";
pub const COL_AMOUNT: &str = "Количество";
pub const COL_MEASUREMENT_UNIT: &str = "Ед. изм.";
pub const COL_ZET: &str = "ЗЕТ";

/// One data row of the discipline sheet, keyed by header label.
/// Empty cells are absent.
pub type RowRecord = HashMap<String, String>;

/// Program metadata from sheet 1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramMetadata {
    pub aup_number: Option<String>,
    pub education_type: Option<String>,
    pub education_level: Option<String>,
    pub direction: Option<String>,
    pub direction_code: Option<String>,
    pub qualification: Option<String>,
    pub profile: Option<String>,
    pub standard_type: Option<String>,
    pub faculty: Option<String>,
}

impl ProgramMetadata {
    /// Pick the recognized labels out of the raw label → value map
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |label: &str| map.get(label).cloned();
        Self {
            aup_number: get(COL_AUP_NUMBER),
            education_type: get(COL_EDUCATION_TYPE),
            education_level: get(COL_EDUCATION_LEVEL),
            direction: get(COL_DIRECTION),
            direction_code: get(COL_DIRECTION_CODE),
            qualification: get(COL_QUALIFICATION),
            profile: get(COL_PROFILE),
            standard_type: get(COL_STANDARD_TYPE),
            faculty: get(COL_FACULTY),
        }
    }
}

/// One discipline entry from sheet 2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisciplineRow {
    pub block: Option<String>,
    pub code: Option<String>,
    pub part: Option<String>,
    pub module: Option<String>,
    pub record_type: Option<String>,
    pub discipline: Option<String>,
    pub period: Option<String>,
    pub load_type: Option<String>,
    pub amount: Option<String>,
    pub measurement_unit: Option<String>,
    pub zet: Option<String>,
}

impl DisciplineRow {
    pub fn from_record(record: &RowRecord) -> Self {
        let get = |label: &str| record.get(label).cloned();
        Self {
            block: get(COL_BLOCK),
            code: get(COL_CODE),
            part: get(COL_PART),
            module: get(COL_MODULE),
            record_type: get(COL_RECORD_TYPE),
            discipline: get(COL_DISCIPLINE_NAME),
            period: get(COL_PERIOD),
            load_type: get(COL_LOAD_TYPE),
            amount: get(COL_AMOUNT),
            measurement_unit: get(COL_MEASUREMENT_UNIT),
            zet: get(COL_ZET),
        }
    }

    /// Trimmed discipline name, `None` when blank
    pub fn discipline_name(&self) -> Option<&str> {
        self.discipline
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Both sheets of one workbook, read in two passes
#[derive(Debug, Clone, Default)]
pub struct ParsedWorkbook {
    pub metadata: ProgramMetadata,
    pub disciplines: Vec<DisciplineRow>,
}
