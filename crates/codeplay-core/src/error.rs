//! Core error types for codeplay-core.
//!
//! This module defines the error hierarchy using thiserror. Run outcomes of
//! the puzzle (collision, goal mismatch) are deliberately not errors; they are
//! values on [`crate::levels::grid::RunOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for codeplay-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Login, signup and session errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Level engine errors
    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    /// Puzzle geometry errors
    #[error("Puzzle error: {0}")]
    Puzzle(#[from] PuzzleError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Authentication and session errors.
///
/// `NotFound`, `TypeMismatch` and `InvalidCredentials` render the same
/// message so a failed login never reveals which check rejected it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or account type")]
    NotFound,

    #[error("invalid username or account type")]
    TypeMismatch,

    #[error("invalid username or account type")]
    InvalidCredentials,

    /// Signup with a username that is already taken
    #[error("username '{username}' already exists")]
    Conflict { username: String },

    /// Operation needs an active session
    #[error("not logged in")]
    NoSession,

    /// Operation needs a different kind of session
    #[error("this action requires a {expected} account")]
    WrongAccountType { expected: &'static str },

    /// Parent references a kid that is not in the store
    #[error("kid account '{username}' not found")]
    DanglingKid { username: String },

    /// Username is empty or whitespace
    #[error("username must not be empty")]
    EmptyUsername,
}

/// Errors raised by the level engines for rejected player input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// Input arrived while a run or a timed transition is in progress
    #[error("busy: wait for the current run to finish")]
    Busy,

    /// The engine already reported its completion
    #[error("level already completed")]
    Completed,

    /// The current quiz question was already answered
    #[error("question already answered")]
    AlreadyAnswered,

    /// Answer text is not one of the question's options
    #[error("'{0}' is not an option for this question")]
    UnknownOption(String),

    /// Block id is not in the problem's toolbox
    #[error("block '{0}' is not in the toolbox")]
    UnknownBlock(String),

    /// Index outside the workspace or command list
    #[error("index {index} out of bounds (length: {len})")]
    OutOfBounds { index: usize, len: usize },

    /// Level has no playable content
    #[error("level {0} has no content")]
    EmptyLevel(u32),

    /// Level id not in the catalog
    #[error("unknown level {0}")]
    UnknownLevel(u32),
}

/// Invalid puzzle geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("grid size must be positive")]
    EmptyGrid,

    #[error("{what} cell ({x}, {y}) is outside the {size}x{size} grid")]
    OutOfGrid {
        what: &'static str,
        x: i32,
        y: i32,
        size: i32,
    },

    #[error("{what} cell ({x}, {y}) is an obstacle")]
    BlockedCell { what: &'static str, x: i32, y: i32 },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
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
