//! Core error types for lumina-core.
//!
//! Missing data (no daily log, no ephemeris entry) is never represented here;
//! those are ordinary branches. Errors are reserved for failed store calls,
//! bad configuration and rejected input.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lumina-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store adapter errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by task, daily log and profile stores.
///
/// None of these are retried locally. Streak resolution is guarded by the
/// unresolved-day check, so the caller can simply try again later.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing store could not serve the request
    #[error("Store unavailable during {operation}: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    /// A keyed record was expected but does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Database is locked
    #[error("Store is locked")]
    Locked,
}

impl StoreError {
    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            operation,
            message: message.into(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Scalar outside its permitted range
    #[error("Value {value} for '{field}' is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Required text was empty after trimming
    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    /// Unparseable date
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::unavailable("sqlite", err.to_string())
                }
            }
            _ => StoreError::unavailable("sqlite", err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_wraps_into_core_error() {
        let err: CoreError = StoreError::unavailable("list_tasks", "connection reset").into();
        assert_eq!(
            err.to_string(),
            "Store error: Store unavailable during list_tasks: connection reset"
        );
    }

    #[test]
    fn rusqlite_no_rows_maps_to_unavailable() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[test]
    fn validation_messages_name_the_field() {
        let err = ValidationError::OutOfRange {
            field: "evening_mood",
            value: 7,
            min: 1,
            max: 5,
        };
        assert!(err.to_string().contains("evening_mood"));
    }
}
