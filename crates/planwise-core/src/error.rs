//! Core error types for planwise-core.
//!
//! This module defines the error hierarchy using thiserror. Note that the
//! scheduling engines themselves never fail: conflict severity and "nothing
//! to optimize" are returned as data. Errors only arise at the boundary
//! (validation, configuration, storage).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for planwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

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

    /// Task lookup by id failed
    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored row could not be decoded into a task
    #[error("Corrupt row for task '{id}': {message}")]
    CorruptRow { id: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors raised when task data crosses into the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Not a zero-padded `HH:MM` wall-clock time
    #[error("Invalid time '{0}': expected HH:MM between 00:00 and 23:59")]
    InvalidTime(String),

    /// Not an ISO `YYYY-MM-DD` date
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Invalid time range
    #[error("Invalid time range: end time ({end}) must not be earlier than start time ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// A field that the task type does not allow
    #[error("Field '{field}' is not allowed on {task_type} tasks")]
    FieldNotAllowed { field: String, task_type: String },

    /// A field that the task type requires
    #[error("Field '{field}' is required on {task_type} tasks")]
    MissingField { field: String, task_type: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_messages_name_the_field() {
        let err = ValidationError::FieldNotAllowed {
            field: "date".to_string(),
            task_type: "daily".to_string(),
        };
        assert_eq!(err.to_string(), "Field 'date' is not allowed on daily tasks");
    }

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::InvalidTime("25:00".to_string()).into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("25:00"));
    }

    #[test]
    fn rusqlite_error_maps_to_query_failed() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
