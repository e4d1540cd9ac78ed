//! Error handling utilities for repositories

use kingdom_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    match e {
        SqlxError::PoolTimedOut => DomainError::Timeout("waiting for a database connection".to_string()),
        other => DomainError::DatabaseError(other.to_string()),
    }
}

/// Postgres reports a cancelled statement (statement_timeout) as SQLSTATE 57014
pub fn is_statement_timeout(e: &SqlxError) -> bool {
    e.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "57014")
}

/// Like `map_db_error`, but reports statement timeouts as `Timeout`
pub fn map_batch_error(e: SqlxError, batch: usize) -> DomainError {
    if is_statement_timeout(&e) {
        DomainError::Timeout(format!("batch {batch} exceeded the statement timeout"))
    } else {
        map_db_error(e)
    }
}
