//! Quiz read model
//!
//! Referenced by `Question::quiz_id` for topic filtering. Quizzes are not
//! written by this workspace.

use serde::{Deserialize, Serialize};

use super::Question;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i32,
    pub topic: String,
    pub difficulty: i32,
    #[serde(default)]
    pub questions: Vec<Question>,
}
