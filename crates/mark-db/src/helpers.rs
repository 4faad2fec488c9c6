//! Row-to-entity parsing helpers.
//!
//! Handles the dual datetime format issue (`SQLite`'s `datetime('now')` vs
//! Rust's `to_rfc3339()`) and identifier quoting for host-configured tables.

use chrono::{DateTime, Utc};
use mark_core::MarkRelation;

use crate::error::DatabaseError;
use crate::store::StoredMark;

/// Columns selected for every relation row, in `row_to_stored` order.
pub const MARK_COLUMNS: &str = "id, marker_type, marker_id, markable_type, markable_id, mark, created_at";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Convert a row selected with [`MARK_COLUMNS`].
///
/// # Errors
///
/// Returns `DatabaseError` if a column is missing or malformed.
pub fn row_to_stored(row: &libsql::Row) -> Result<StoredMark, DatabaseError> {
    Ok(StoredMark {
        row_id: row.get::<i64>(0)?,
        relation: MarkRelation {
            marker_type: row.get::<String>(1)?,
            marker_id: row.get::<String>(2)?,
            markable_type: row.get::<String>(3)?,
            markable_id: row.get::<String>(4)?,
            mark: row.get::<String>(5)?,
            created_at: parse_datetime(&row.get::<String>(6)?)?,
        },
    })
}

/// Double-quote an identifier after checking it is a bare SQL name.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` for anything outside
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
    if mark_config::is_identifier(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(DatabaseError::InvalidState(format!(
            "'{name}' is not a valid SQL identifier"
        )))
    }
}
