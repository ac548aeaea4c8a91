//! Argument types shared by the write commands

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use clap::Args;
use quizctl_core::{Question, Response};

/// A `TEXT:BOOL` response argument, split on the last colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseArg {
    pub text: String,
    pub correct: bool,
}

impl FromStr for ResponseArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (text, flag) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("expected TEXT:true or TEXT:false, got '{}'", s))?;

        let correct = match flag.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => true,
            "false" | "f" | "no" | "n" | "0" => false,
            other => bail!("'{}' is not a boolean (in '{}')", other, s),
        };

        if text.trim().is_empty() {
            bail!("response text cannot be empty (in '{}')", s);
        }

        Ok(Self {
            text: text.to_string(),
            correct,
        })
    }
}

impl From<ResponseArg> for Response {
    fn from(arg: ResponseArg) -> Self {
        Response::new(arg.text, arg.correct)
    }
}

/// Fields written by `create` and `update`.
#[derive(Args, Debug)]
pub struct QuestionArgs {
    /// Question text
    #[arg(long)]
    pub content: String,

    /// Id of the quiz the question belongs to
    #[arg(long)]
    pub quiz_id: i32,

    /// Candidate response as TEXT:true|false (repeatable, order kept)
    #[arg(long = "response", short = 'r', value_name = "TEXT:BOOL", value_parser = parse_response)]
    pub responses: Vec<ResponseArg>,
}

fn parse_response(s: &str) -> Result<ResponseArg, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

impl QuestionArgs {
    pub fn into_question(self) -> Question {
        let mut question = Question::new(self.content, self.quiz_id);
        for response in self.responses {
            question.add_response(response.into());
        }
        question
    }
}

/// Parse a question id, rejecting non-positive values.
pub fn parse_question_id(s: &str) -> Result<i32, String> {
    let id: i32 = s
        .parse()
        .map_err(|e| format!("invalid question id '{}': {}", s, e))?;
    if id <= 0 {
        return Err(format!("invalid question id '{}': must be positive", s));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_and_flag() {
        let arg: ResponseArg = "Paris:true".parse().unwrap();
        assert_eq!(arg.text, "Paris");
        assert!(arg.correct);

        let arg: ResponseArg = "Lyon:no".parse().unwrap();
        assert!(!arg.correct);
    }

    #[test]
    fn splits_on_last_colon() {
        let arg: ResponseArg = "Ratio 1:2:false".parse().unwrap();
        assert_eq!(arg.text, "Ratio 1:2");
        assert!(!arg.correct);
    }

    #[test]
    fn rejects_missing_flag() {
        assert!("Paris".parse::<ResponseArg>().is_err());
        assert!("Paris:maybe".parse::<ResponseArg>().is_err());
        assert!(" :true".parse::<ResponseArg>().is_err());
    }

    #[test]
    fn builds_question_in_order() {
        let args = QuestionArgs {
            content: "Capital of France?".to_string(),
            quiz_id: 1,
            responses: vec!["Paris:true".parse().unwrap(), "Lyon:false".parse().unwrap()],
        };

        let question = args.into_question();
        assert_eq!(question.id, None);
        assert_eq!(question.responses[0], Response::new("Paris", true));
        assert_eq!(question.responses[1], Response::new("Lyon", false));
    }

    #[test]
    fn question_id_must_be_positive() {
        assert_eq!(parse_question_id("12"), Ok(12));
        assert!(parse_question_id("0").is_err());
        assert!(parse_question_id("abc").is_err());
    }
}
