//! quizctl-db: PostgreSQL persistence for questions and responses
//!
//! # Design Principles
//!
//! - Connection pool, one connection (or transaction) per operation
//! - Every multi-statement write is a single transaction, rolled back on any failure
//! - Children are removed before their parent; no reliance on ON DELETE CASCADE
//! - Errors are typed: callers tell not-found from unreachable from constraint failures

pub mod error;
pub mod pool;
pub mod repos;

pub use error::{ConstraintKind, DbError};
pub use pool::{connect_options, create_pool, ping};
pub use repos::{DeleteOutcome, QuestionRepo};
pub use sqlx::PgPool;
