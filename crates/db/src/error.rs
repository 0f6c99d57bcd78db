//! Errors raised by the task store

use std::error::Error as _;
use std::path::PathBuf;
use tally_core::ReportError;
use thiserror::Error;

/// Everything that can go wrong between the CLI and SurrealDB
#[derive(Error, Debug)]
pub enum DbError {
    /// The storage engine could not be opened
    #[error("cannot open task store at {path}")]
    Connection {
        path: PathBuf,
        #[source]
        source: Box<surrealdb::Error>,
    },

    /// Namespace selection or table definitions were rejected
    #[error("cannot define task schema")]
    Schema(#[source] Box<surrealdb::Error>),

    /// A statement failed or returned rows of an unexpected shape
    #[error("task query failed")]
    Query(#[source] Box<surrealdb::Error>),

    /// The store location is unusable
    #[error("unusable store location {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("no task with id '{task_id}'")]
    NotFound { task_id: String },

    /// The store directory could not be created
    #[error("cannot create store directory {path}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input rejected before reaching the store
    #[error("{message}")]
    ValidationError { message: String },

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        DbError::Query(Box::new(err))
    }
}

impl DbError {
    /// The message followed by every underlying cause, separated by `: `
    pub fn full_message(&self) -> String {
        let mut message = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        message
    }
}

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;
