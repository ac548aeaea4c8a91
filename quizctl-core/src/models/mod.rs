//! Domain models
//!
//! Entities carry identity and attributes only. Validation runs before
//! any write so malformed input never reaches the store.

pub mod question;
pub mod quiz;
pub mod validation;

pub use question::{Question, QuestionId, Response};
pub use quiz::Quiz;
pub use validation::ValidationError;
