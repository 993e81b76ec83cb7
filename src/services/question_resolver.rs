use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    dao::question_source::{QuestionSource, SourceError},
    state::{difficulty::Difficulty, question::Question},
};

/// A failed attempt recorded while resolving a question.
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: SourceError,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Errors returned by [`QuestionResolver`].
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolver was built without any source.
    #[error("question resolver needs at least one source")]
    NoSources,
    /// Every configured source failed for this request.
    #[error("all question sources failed: {}", join_failures(.failures))]
    AllSourcesExhausted { failures: Vec<SourceFailure> },
}

fn join_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Ordered chain of question sources; the first one that succeeds wins.
pub struct QuestionResolver {
    sources: Vec<Arc<dyn QuestionSource>>,
}

impl QuestionResolver {
    pub fn new(sources: Vec<Arc<dyn QuestionSource>>) -> Result<Self, ResolverError> {
        if sources.is_empty() {
            return Err(ResolverError::NoSources);
        }
        Ok(Self { sources })
    }

    /// Names of the configured sources in the order they are tried.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Try each source in order and return the first question obtained.
    ///
    /// Sources after the first success are never consulted. Each failure is
    /// logged before moving on to the next source.
    pub async fn resolve(&self, difficulty: Difficulty) -> Result<Question, ResolverError> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.fetch(difficulty).await {
                Ok(question) => {
                    debug!(source = source.name(), %difficulty, "question resolved");
                    return Ok(question);
                }
                Err(error) => {
                    warn!(
                        source = source.name(),
                        %difficulty,
                        error = %error,
                        "question source failed; trying next"
                    );
                    failures.push(SourceFailure {
                        source: source.name().to_string(),
                        error,
                    });
                }
            }
        }

        Err(ResolverError::AllSourcesExhausted { failures })
    }
}
