//! Spreadsheet import
//!
//! Turns an uploaded `.csv`, `.xlsx`, `.xls` or `.ods` file into validated
//! player rows. The first non-empty row is the header; fully blank rows are
//! skipped. Any problem is reported before anything is persisted.

mod columns;
mod reader;
mod row;

use std::collections::HashSet;

use kingdom_core::{DomainError, LordId};

pub use columns::{normalize_header, Column, HeaderMap};
pub use reader::{FileKind, RawRow};
pub use row::{parse_count, parse_row, ParsedRow};

/// Validated contents of one upload, in file order
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub kind: FileKind,
    pub rows: Vec<ParsedRow>,
}

impl ParsedSheet {
    /// Distinct lord ids in first-appearance order
    pub fn lord_ids(&self) -> Vec<LordId> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.lord_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<ParsedSheet, DomainError> {
    let kind = FileKind::from_filename(filename)?;
    if bytes.is_empty() {
        return Err(DomainError::EmptyUpload);
    }

    let mut rows = reader::read_table(kind, bytes)?
        .into_iter()
        .filter(|raw| !raw.is_blank());

    let header_row = rows.next().ok_or(DomainError::EmptyUpload)?;
    let header = HeaderMap::resolve(&header_row.cells)?;

    let rows = rows
        .map(|raw| parse_row(&header, &raw))
        .collect::<Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Err(DomainError::EmptyUpload);
    }

    Ok(ParsedSheet { kind, rows })
}
