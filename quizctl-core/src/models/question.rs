//! Question and response entities

use serde::{Deserialize, Serialize};

use super::validation::{check_text, ValidationError};

/// Store-assigned question identifier
pub type QuestionId = i32;

/// Maximum length for question content
const MAX_CONTENT_LEN: usize = 4096;

/// Maximum length for response text
const MAX_RESPONSE_LEN: usize = 1024;

/// A candidate response to a question.
///
/// Responses have no lifecycle of their own. The owning question id is
/// stamped by the repository during cascade writes and is not part of
/// the in-memory entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Store-assigned; `None` until the owning question is written.
    pub id: Option<i32>,
    pub text: String,
    pub correct: bool,
}

impl Response {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            id: None,
            text: text.into(),
            correct,
        }
    }
}

/// A quiz question with its ordered responses.
///
/// `id` is `None` while unsaved and is assigned exactly once, by a
/// successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Option<QuestionId>,
    pub content: String,
    pub quiz_id: i32,
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl Question {
    /// Create an unsaved question with no responses.
    ///
    /// # Example
    /// ```
    /// use quizctl_core::{Question, Response};
    ///
    /// let q = Question::new("Capital of France?", 1)
    ///     .with_response(Response::new("Paris", true))
    ///     .with_response(Response::new("Lyon", false));
    /// assert!(!q.is_persisted());
    /// assert_eq!(q.responses.len(), 2);
    /// ```
    pub fn new(content: impl Into<String>, quiz_id: i32) -> Self {
        Self {
            id: None,
            content: content.into(),
            quiz_id,
            responses: Vec::new(),
        }
    }

    /// Append a response, keeping insertion order.
    pub fn add_response(&mut self, response: Response) {
        self.responses.push(response);
    }

    /// Builder form of [`Question::add_response`].
    pub fn with_response(mut self, response: Response) -> Self {
        self.add_response(response);
        self
    }

    /// Whether the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Check content and every response text.
    ///
    /// # Rules
    /// - Content non-blank, max 4096 characters
    /// - Response text non-blank, max 1024 characters
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("content", &self.content, MAX_CONTENT_LEN)?;
        for response in &self.responses {
            check_text("response text", &response.text, MAX_RESPONSE_LEN)?;
        }
        Ok(())
    }
}
