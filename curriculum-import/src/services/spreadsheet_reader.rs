//! Curriculum workbook reader
//!
//! Sheet 1 is read without a header as a label → value list. Sheet 2 is read
//! with its first row as the header; every later row becomes a record keyed
//! by header label. Any format calamine auto-detects is accepted.

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::PathBuf;

use crate::error::{ImportError, ImportResult};
use crate::models::workbook::{RowRecord, DISCIPLINES_SHEET_INDEX, PROGRAM_SHEET_INDEX};

/// Where a workbook comes from
#[derive(Debug, Clone)]
pub enum WorkbookSource {
    /// File on disk
    Path(PathBuf),
    /// In-memory upload; rewound before every read pass
    Upload { name: String, cursor: Cursor<Vec<u8>> },
}

impl WorkbookSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        WorkbookSource::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        WorkbookSource::Upload {
            name: name.into(),
            cursor: Cursor::new(bytes),
        }
    }

    /// Path or upload name, used in errors and logs
    pub fn name(&self) -> String {
        match self {
            WorkbookSource::Path(path) => path.display().to_string(),
            WorkbookSource::Upload { name, .. } => name.clone(),
        }
    }

    /// Open the workbook and return one sheet's used range
    fn sheet_range(&mut self, index: usize) -> ImportResult<Range<Data>> {
        match self {
            WorkbookSource::Path(path) => {
                let mut workbook = open_workbook_auto(&*path)
                    .map_err(|e| parse_error_for(path.display(), e))?;
                sheet_at(&mut workbook, index).map_err(|msg| parse_error_for(path.display(), msg))
            }
            WorkbookSource::Upload { name, cursor } => {
                cursor.set_position(0);
                let mut workbook = open_workbook_auto_from_rs(cursor.clone())
                    .map_err(|e| parse_error_for(&*name, e))?;
                sheet_at(&mut workbook, index).map_err(|msg| parse_error_for(&*name, msg))
            }
        }
    }
}

fn parse_error_for(name: impl fmt::Display, message: impl fmt::Display) -> ImportError {
    ImportError::Parse {
        path: name.to_string(),
        message: message.to_string(),
    }
}

fn sheet_at<RS: Read + Seek>(workbook: &mut Sheets<RS>, index: usize) -> Result<Range<Data>, String> {
    match workbook.worksheet_range_at(index) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(format!("sheet {} unreadable: {}", index + 1, e)),
        None => Err(format!("sheet {} is missing", index + 1)),
    }
}

/// Render a cell as trimmed text; empty and error cells are `None`
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // f64 Display drops the fraction of integral values: 3.0 -> "3"
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Read sheet 1 as a label → value map
///
/// Rows whose label or value is empty are absent. A repeated label keeps
/// the last value.
pub fn read_program_metadata(source: &mut WorkbookSource) -> ImportResult<HashMap<String, String>> {
    let range = source.sheet_range(PROGRAM_SHEET_INDEX)?;

    let mut map = HashMap::new();
    for row in range.rows() {
        let key = row.first().and_then(cell_text);
        let value = row.get(1).and_then(cell_text);
        if let (Some(key), Some(value)) = (key, value) {
            map.insert(key, value);
        }
    }

    tracing::debug!(source = %source.name(), labels = map.len(), "Read program sheet");
    Ok(map)
}

/// Read sheet 2 as header-keyed records, dropping fully empty rows
///
/// A blank sheet yields no records.
pub fn read_discipline_rows(source: &mut WorkbookSource) -> ImportResult<Vec<RowRecord>> {
    let range = source.sheet_range(DISCIPLINES_SHEET_INDEX)?;

    let mut rows = range.rows();
    let header: Vec<Option<String>> = match rows.next() {
        Some(cells) => cells.iter().map(cell_text).collect(),
        None => {
            tracing::debug!(source = %source.name(), "Discipline sheet is blank");
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::new();
    for cells in rows {
        let record: RowRecord = header
            .iter()
            .zip(cells.iter())
            .filter_map(|(label, cell)| Some((label.clone()?, cell_text(cell)?)))
            .collect();
        if !record.is_empty() {
            records.push(record);
        }
    }

    tracing::debug!(source = %source.name(), rows = records.len(), "Read discipline sheet");
    Ok(records)
}
