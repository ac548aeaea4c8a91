//! quizctl-core: quiz entities and connection configuration
//!
//! Plain data holders shared by the persistence layer and the CLI.
//! Nothing in this crate talks to the database.

pub mod config;
pub mod models;

pub use config::DatabaseConfig;
pub use models::{Question, QuestionId, Quiz, Response, ValidationError};
