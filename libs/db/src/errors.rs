//! Shared database error helpers (unique-violation classification).

use sea_orm::{DbErr, SqlErr};

/// Returns true if the given SQLSTATE / extended code represents a unique constraint
/// violation (Postgres 23505, SQLite 2067 unique and 1555 primary key).
pub fn is_unique_violation_code(code: &str) -> bool {
    matches!(code, "23505" | "2067" | "1555")
}

/// The driver message of a unique-constraint violation, `None` for any other error.
pub fn unique_violation_message(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => Some(msg),
        _ => None,
    }
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    unique_violation_message(err).is_some()
}

/// Whether a violation message names `column`.
///
/// SQLite reports `UNIQUE constraint failed: people.email`; Postgres reports the index
/// name, so unique indexes must carry the column name in theirs.
pub fn violation_mentions(message: &str, column: &str) -> bool {
    message
        .to_ascii_lowercase()
        .contains(&column.to_ascii_lowercase())
}
