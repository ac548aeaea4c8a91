//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses transactions for multi-step operations
//! - Deletes child rows before their parent
//! - Reports absent targets explicitly instead of succeeding silently

pub mod questions;

pub use questions::{DeleteOutcome, QuestionRepo};
