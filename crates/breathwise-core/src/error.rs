//! Core error types for breathwise-core.
//!
//! This module defines the error hierarchy using thiserror. Each layer
//! (storage, configuration, time parsing, notification platform) has its own
//! enum which converts into [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for breathwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reminder time could not be parsed
    #[error("Time error: {0}")]
    Time(#[from] TimeParseError),

    /// Notification platform errors
    #[error("Notification platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
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

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A record could not be encoded or decoded
    #[error("Record '{key}' could not be (de)serialized: {message}")]
    Serialize { key: String, message: String },

    /// Generic backend failure (used by non-SQLite stores)
    #[error("{0}")]
    Backend(String),
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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// A display time that is not in the `H:MM AM|PM` shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("expected 'H:MM AM|PM', got '{0}'")]
    Shape(String),

    #[error("invalid hour in '{0}' (expected 1-12)")]
    Hour(String),

    #[error("invalid minute in '{0}' (expected 00-59)")]
    Minute(String),

    #[error("invalid period marker in '{0}' (expected AM or PM)")]
    Period(String),

    #[error("time {hour}:{minute:02} is out of range")]
    OutOfRange { hour: u32, minute: u32 },
}

/// Errors reported by a notification platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user has not granted notification permission
    #[error("notification permission denied")]
    PermissionDenied,

    /// The platform refused to install a trigger
    #[error("failed to install trigger at {hour}:{minute:02}: {message}")]
    InstallFailed { hour: u8, minute: u8, message: String },

    /// The platform could not cancel a trigger
    #[error("failed to cancel trigger '{id}': {message}")]
    CancelFailed { id: String, message: String },

    /// The platform backend is not reachable
    #[error("notification platform unavailable: {0}")]
    Unavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
