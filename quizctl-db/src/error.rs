//! Error types for quizctl-db
//!
//! Store errors are classified once, at the `From<sqlx::Error>` boundary,
//! so every repository operation reports the same kinds.

use std::fmt;
use std::time::Duration;

use quizctl_core::{QuestionId, ValidationError};
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Kind of integrity constraint the store rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    ForeignKey,
    Unique,
    NotNull,
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ForeignKey => "foreign key",
            Self::Unique => "unique",
            Self::NotNull => "not null",
            Self::Check => "check",
        };
        f.write_str(name)
    }
}

/// Database error type
#[derive(Debug, Error)]
pub enum DbError {
    /// Store unreachable, authentication rejected, or pool exhausted.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// e.g. a question referencing a quiz that does not exist
    #[error("{kind} constraint violated: {message}")]
    Constraint {
        kind: ConstraintKind,
        constraint: Option<String>,
        message: String,
    },

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("question has no id; create it before updating")]
    Unsaved,

    #[error("question already persisted with id {0}")]
    AlreadyPersisted(QuestionId),

    #[error("insert returned no generated key")]
    NoRowsAffected,

    #[error("invalid question: {0}")]
    Validation(#[from] ValidationError),

    #[error("operation exceeded deadline of {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Sqlx(#[source] sqlx::Error),
}

impl DbError {
    pub(crate) fn question_not_found(id: QuestionId) -> Self {
        Self::NotFound {
            resource: "question",
            id: id.to_string(),
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Nothing in this crate retries; the caller owns that policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// SQLSTATE classes that mean the session itself is unusable:
/// 08 connection exception, 28 invalid authorization, 3D invalid catalog name.
fn is_connection_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("28") || code.starts_with("3D")
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err),
            sqlx::Error::Database(ref db) => {
                let kind = match db.kind() {
                    ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                    ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                    ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                    ErrorKind::CheckViolation => Some(ConstraintKind::Check),
                    _ => None,
                };

                if let Some(kind) = kind {
                    return Self::Constraint {
                        kind,
                        constraint: db.constraint().map(str::to_owned),
                        message: db.message().to_owned(),
                    };
                }

                let session_failed = db.code().is_some_and(|code| is_connection_sqlstate(&code));
                if session_failed {
                    Self::Connection(err)
                } else {
                    Self::Sqlx(err)
                }
            }
            other => Self::Sqlx(other),
        }
    }
}
