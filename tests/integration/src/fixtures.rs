//! Test fixtures and data generators
//!
//! Spreadsheet builders plus the response shapes the tests read back.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// One exported player row
#[derive(Debug, Clone)]
pub struct SheetRow {
    pub lord_id: i64,
    pub name: String,
    pub alliance: String,
    pub power: i64,
}

impl SheetRow {
    pub fn new(lord_id: i64, name: &str, alliance: &str, power: i64) -> Self {
        Self {
            lord_id,
            name: name.to_string(),
            alliance: alliance.to_string(),
            power,
        }
    }
}

/// Render rows as an export CSV with the game's own header spelling
pub fn export_csv(rows: &[SheetRow]) -> String {
    let mut csv = String::from("Lord ID,Name,Alliance Tag,Power,Units Killed,City Level\n");
    for row in rows {
        let _ = writeln!(
            csv,
            "{},{},{},\"{}\",0,25",
            row.lord_id,
            row.name,
            row.alliance,
            group_thousands(row.power)
        );
    }
    csv
}

/// `1234567` -> `1,234,567`, the way the game exports numbers
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `n` distinct players, ids starting at `first`
pub fn numbered_rows(first: i64, n: i64) -> Vec<SheetRow> {
    (first..first + n)
        .map(|id| SheetRow::new(id, &format!("lord-{id}"), "KOR", id * 1_000))
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct SweepSummary {
    pub evaluated: usize,
    pub marked_left: usize,
    pub cleared: usize,
    pub failed: usize,
}

#[derive(Debug, Deserialize)]
pub struct IngestionResponse {
    pub upload_id: String,
    pub snapshot_id: String,
    pub rows_processed: usize,
    pub new_players: usize,
    pub name_changes: usize,
    pub alliance_changes: usize,
    pub realm: SweepSummary,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub filename: String,
    pub status: String,
    pub row_count: i64,
    pub error_message: Option<String>,
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotResponse {
    pub id: String,
    pub captured_at: String,
    pub kingdom: String,
    pub row_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlayerResponse {
    pub lord_id: String,
    pub current_name: String,
    pub current_alliance: Option<String>,
    pub has_left_realm: bool,
    pub left_realm_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct PageMeta {
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotPlayer {
    pub lord_id: String,
    pub name: String,
    pub has_left_realm: bool,
}

#[derive(Debug, Deserialize)]
pub struct NameChange {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AllianceChange {
    pub old_alliance: Option<String>,
    pub new_alliance: Option<String>,
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerHistory {
    pub player: PlayerResponse,
    pub stats: Vec<serde_json::Value>,
    pub name_changes: Vec<NameChange>,
    pub alliance_changes: Vec<AllianceChange>,
}

#[derive(Debug, Deserialize)]
pub struct LeftRealmResponse {
    pub player: PlayerResponse,
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SweepResponse {
    pub evaluated: usize,
    pub marked_left: Vec<String>,
    pub cleared: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Body for the manual left-realm endpoint
#[derive(Debug, Serialize)]
pub struct MarkLeftRealm {
    pub at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(52_000_000), "52,000,000");
    }
}
