//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. Timestamps are written with [`format_datetime`] so that TEXT
//! comparisons in SQL order the same way as the instants they encode.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use lat_core::enums::EntityType;

use crate::error::DatabaseError;

/// Current time at the precision the database stores.
#[must_use]
pub fn now() -> DateTime<Utc> {
    stamp(Utc::now())
}

/// Truncate to the stored precision (microseconds).
#[must_use]
pub fn stamp(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(6)
}

/// Format a timestamp for storage: `2024-06-12T00:00:00.000000Z`.
#[must_use]
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles RFC 3339 and `SQLite`'s `datetime('now')` format
/// (`"2026-02-09 14:30:00"`).
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

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse a TEXT column holding JSON. An empty column decodes as `{}`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string contains invalid JSON.
pub fn parse_json(s: Option<&str>) -> Result<serde_json::Value, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => serde_json::from_str(s)
            .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}"))),
        _ => Ok(serde_json::Value::Object(serde_json::Map::new())),
    }
}

/// Read a `COUNT(*)` result from the first column of the first row.
///
/// # Errors
///
/// Returns `DatabaseError::NoResult` if no row came back.
pub async fn read_count(mut rows: libsql::Rows) -> Result<u64, DatabaseError> {
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let count = row.get::<i64>(0)?;
    u64::try_from(count).map_err(|_| DatabaseError::Query(format!("negative count: {count}")))
}

/// Read the `id` returned by an `INSERT ... RETURNING id`.
///
/// # Errors
///
/// Returns `DatabaseError::NoResult` if the statement returned nothing.
pub async fn read_returned_id(mut rows: libsql::Rows) -> Result<i64, DatabaseError> {
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

/// Fail with `NotFound` unless a row with `id` exists in the entity's table.
///
/// Takes a connection so it can run inside a transaction.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the row is missing.
pub async fn ensure_exists(
    conn: &libsql::Connection,
    entity: EntityType,
    id: i64,
) -> Result<(), DatabaseError> {
    let table = entity_type_to_table(entity);
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
    let mut rows = conn.query(&sql, libsql::params![id]).await?;
    match rows.next().await? {
        Some(_) => Ok(()),
        None => Err(DatabaseError::not_found(entity, id)),
    }
}

/// Fresh v4 UUID as a hyphenated string.
#[must_use]
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Map `EntityType` to the corresponding SQL table name.
///
/// Exhaustive, so a new `EntityType` variant must be mapped here.
#[must_use]
pub const fn entity_type_to_table(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Workspace => "workspaces",
        EntityType::Project => "projects",
        EntityType::Commit => "commits",
        EntityType::DocumentVersion => "document_versions",
        EntityType::DocumentLog => "document_logs",
        EntityType::Evaluation => "evaluations",
        EntityType::EvaluationResult => "evaluation_results",
    }
}
