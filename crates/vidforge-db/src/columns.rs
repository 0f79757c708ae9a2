//! Idempotent column checks and additions.
//!
//! Older vidforge databases were created before `t_video.time` existed. The
//! helpers here detect a missing column and add it as a nullable `INTEGER`.
//! Running them again once the column exists is a no-op.

use rusqlite::{Connection, OptionalExtension};
use vidforge_common::{Error, Result};

/// Table holding generated video records.
pub const VIDEO_TABLE: &str = "t_video";

/// Generation time in seconds, added to [`VIDEO_TABLE`] after the fact.
pub const VIDEO_TIME_COLUMN: &str = "time";

/// What [`ensure_integer_column`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOutcome {
    /// The column was missing and has been added.
    Added,
    /// The column already existed; nothing changed.
    AlreadyPresent,
}

impl std::fmt::Display for ColumnOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::AlreadyPresent => write!(f, "already present"),
        }
    }
}

/// Schema details of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type as written in the schema, e.g. `INTEGER`.
    pub declared_type: String,
    pub not_null: bool,
}

/// Reject anything that isn't a bare SQL identifier.
///
/// Table and column names cannot be bound as parameters in DDL, so they are
/// restricted to `[A-Za-z_][A-Za-z0-9_]*` before being quoted into SQL.
fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "invalid {} name: {:?}",
            kind, name
        )))
    }
}

/// Check whether a table exists.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    validate_identifier("table", table)?;

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            [table],
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(count > 0)
}

/// Look up a column's schema entry.
///
/// # Returns
///
/// * `Ok(Some(ColumnInfo))` - The column exists
/// * `Ok(None)` - The table exists but has no such column
/// * `Err(Error::NotFound)` - The table does not exist
pub fn describe_column(conn: &Connection, table: &str, column: &str) -> Result<Option<ColumnInfo>> {
    validate_identifier("column", column)?;

    if !table_exists(conn, table)? {
        return Err(Error::not_found(format!("table {}", table)));
    }

    conn.query_row(
        "SELECT name, type, \"notnull\" FROM pragma_table_info(?1) WHERE name = ?2 COLLATE NOCASE",
        [table, column],
        |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                declared_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
            })
        },
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Check whether `table` has a column named `column` (case-insensitive).
pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    Ok(describe_column(conn, table, column)?.is_some())
}

/// Add `column` to `table` as a nullable `INTEGER` if it is missing.
///
/// Errors from SQLite are propagated as-is; there is no rollback beyond what
/// the failed `ALTER TABLE` itself leaves behind.
pub fn ensure_integer_column(conn: &Connection, table: &str, column: &str) -> Result<ColumnOutcome> {
    if has_column(conn, table, column)? {
        tracing::info!(table, column, "Column already exists");
        return Ok(ColumnOutcome::AlreadyPresent);
    }

    conn.execute(
        &format!("ALTER TABLE \"{}\" ADD COLUMN \"{}\" INTEGER", table, column),
        [],
    )
    .map_err(|e| Error::database(format!("failed to add {}.{}: {}", table, column, e)))?;

    tracing::info!(table, column, "Added column");
    Ok(ColumnOutcome::Added)
}

/// Make sure `t_video.time` exists.
pub fn ensure_video_time_column(conn: &Connection) -> Result<ColumnOutcome> {
    ensure_integer_column(conn, VIDEO_TABLE, VIDEO_TIME_COLUMN)
}
