mod fixed;
#[cfg(feature = "remote-questions")]
mod remote;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::{
    difficulty::Difficulty,
    question::{Question, QuestionError},
};

pub use fixed::{StaticQuestionSource, StaticSourceError, builtin_questions};
#[cfg(feature = "remote-questions")]
pub use remote::RemoteQuestionSource;

/// Why a source could not provide a question. Never carries a partial question.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be sent, timed out or was interrupted.
    #[error("question request failed: {message}")]
    Request {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The provider answered with a non-success status.
    #[error("question provider answered with status {status}")]
    Status { status: u16 },
    /// The payload did not contain a usable question.
    #[error("malformed question payload: {message}")]
    Malformed { message: String },
    /// The payload described a question that fails validation.
    #[error("question provider returned an invalid question")]
    InvalidQuestion(#[from] QuestionError),
}

impl SourceError {
    /// Construct a request error from any transport failure.
    pub fn request(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        SourceError::Request {
            message,
            source: Box::new(source),
        }
    }
}

/// Provider of quiz questions.
pub trait QuestionSource: Send + Sync {
    /// Short label used when reporting failures.
    fn name(&self) -> &str;
    /// Produce one question suited to `difficulty`.
    fn fetch(&self, difficulty: Difficulty) -> BoxFuture<'static, Result<Question, SourceError>>;
}
