//! Conversions from storage errors into the workspace error type.

use bookstore_common::Error;
use rusqlite::{ffi, ErrorCode};

/// Classify a rusqlite error by its extended result code.
///
/// Unique and primary-key violations become [`Error::Conflict`]; every other
/// constraint failure (foreign key, check, not null) becomes
/// [`Error::Constraint`]. Anything else is a plain database error.
pub fn from_rusqlite(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            let detail = message.clone().unwrap_or_else(|| failure.to_string());
            return match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    Error::Conflict(detail)
                }
                _ => Error::Constraint(detail),
            };
        }
    }
    Error::database(err)
}

/// Wrap a pool checkout failure.
pub fn from_pool(err: r2d2::Error) -> Error {
    Error::database(format!("Failed to get connection from pool: {err}"))
}
