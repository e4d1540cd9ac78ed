//! Raw table extraction from CSV and workbook files

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use kingdom_core::DomainError;

/// Accepted upload formats, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
    Ods,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Result<Self, DomainError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "ods" => Ok(Self::Ods),
            _ => Err(DomainError::UnsupportedFileType(filename.to_string())),
        }
    }

    pub fn is_workbook(self) -> bool {
        !matches!(self, Self::Csv)
    }
}

/// One physical row with its 1-based spreadsheet row number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub number: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.trim().is_empty())
    }
}

pub fn read_table(kind: FileKind, bytes: &[u8]) -> Result<Vec<RawRow>, DomainError> {
    if kind.is_workbook() {
        read_workbook(bytes.to_vec())
    } else {
        read_csv(bytes)
    }
}

fn read_csv(bytes: &[u8]) -> Result<Vec<RawRow>, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DomainError::UnreadableFile(e.to_string()))?;
        let number = record
            .position()
            .map_or(index + 1, |position| position.line() as usize);
        rows.push(RawRow {
            number,
            cells: record.iter().map(str::to_string).collect(),
        });
    }
    Ok(rows)
}

/// First worksheet only
fn read_workbook(bytes: Vec<u8>) -> Result<Vec<RawRow>, DomainError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DomainError::UnreadableFile(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DomainError::UnreadableFile("workbook has no worksheets".to_string()))?
        .map_err(|e| DomainError::UnreadableFile(e.to_string()))?;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    Ok(range
        .rows()
        .enumerate()
        .map(|(index, cells)| RawRow {
            number: first_row + index + 1,
            cells: cells.iter().map(cell_text).collect(),
        })
        .collect())
}

/// Render a workbook cell the way it would appear in a CSV export
///
/// Whole floats drop their fraction so ids and counters stored as numbers
/// parse the same as their text form.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract().abs() < f64::EPSILON && value.abs() < 9.0e15 => {
            (*value as i64).to_string()
        }
        other => other.to_string(),
    }
}
