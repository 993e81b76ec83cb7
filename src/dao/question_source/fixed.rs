use std::sync::Arc;

use futures::future::BoxFuture;
use rand::Rng;
use thiserror::Error;

use crate::state::{
    difficulty::Difficulty,
    question::{Question, QuestionError},
};

use super::{QuestionSource, SourceError};

/// Questions served when the remote provider is unreachable.
const BUILTIN: [(&str, [&str; 4], &str); 3] = [
    (
        "What is the area, in square centimetres, of one cell of a standard school notebook?",
        ["0.25", "1.00", "0.5", "1.25"],
        "0.25",
    ),
    (
        "What is the equatorial radius of the Earth in kilometres?",
        ["6378.1", "6356.8", "6371.0", "6384.1"],
        "6378.1",
    ),
    (
        "Which planet of the Solar System is the farthest from the Sun and the Earth?",
        ["Jupiter", "Neptune", "Venus", "Mars"],
        "Neptune",
    ),
];

/// Rejected static source configuration.
#[derive(Debug, Error)]
pub enum StaticSourceError {
    /// No question to choose from.
    #[error("static question source needs at least one question")]
    Empty,
    /// One of the built-in questions fails validation.
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}

/// The built-in fallback questions.
pub fn builtin_questions() -> Result<Vec<Question>, QuestionError> {
    BUILTIN
        .iter()
        .map(|(prompt, options, correct)| {
            Question::new(
                *prompt,
                options.iter().map(|option| option.to_string()).collect(),
                *correct,
            )
        })
        .collect()
}

/// Serves a uniformly random question from a fixed list, whatever the difficulty.
#[derive(Debug, Clone)]
pub struct StaticQuestionSource {
    questions: Arc<[Question]>,
}

impl StaticQuestionSource {
    /// Source over `questions`, which must not be empty.
    pub fn new(questions: Vec<Question>) -> Result<Self, StaticSourceError> {
        if questions.is_empty() {
            return Err(StaticSourceError::Empty);
        }
        Ok(Self {
            questions: questions.into(),
        })
    }

    /// Source over [`builtin_questions`].
    pub fn builtin() -> Result<Self, StaticSourceError> {
        Self::new(builtin_questions()?)
    }

    /// Every question the source can serve.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

impl QuestionSource for StaticQuestionSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, _difficulty: Difficulty) -> BoxFuture<'static, Result<Question, SourceError>> {
        let index = rand::rng().random_range(0..self.questions.len());
        let question = self.questions[index].clone();
        Box::pin(async move { Ok::<_, SourceError>(question) })
    }
}
