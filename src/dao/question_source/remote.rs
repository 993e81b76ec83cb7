use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;

use crate::state::{
    difficulty::Difficulty,
    question::{OPTION_COUNT, Question},
};

use super::{QuestionSource, SourceError};

/// Expected payload; the first answer is the correct one.
#[derive(Debug, Deserialize)]
struct QuestionPayload {
    question: String,
    answers: Vec<String>,
}

/// Fetches questions from an HTTP API taking a `complexity` query parameter.
#[derive(Clone)]
pub struct RemoteQuestionSource {
    client: Client,
    endpoint: Arc<str>,
}

impl RemoteQuestionSource {
    /// Build a source for `endpoint` whose requests give up after `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::request("failed to build HTTP client".into(), source))?;

        Ok(Self {
            client,
            endpoint: Arc::from(endpoint.into()),
        })
    }

    async fn request(&self, difficulty: Difficulty) -> Result<Question, SourceError> {
        let response = self
            .client
            .get(self.endpoint.as_ref())
            .query(&[("complexity", difficulty.level())])
            .send()
            .await
            .map_err(|source| {
                SourceError::request(format!("GET {} failed", self.endpoint), source)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| {
            SourceError::request(format!("reading body from {} failed", self.endpoint), source)
        })?;

        let payload = serde_json::from_slice::<QuestionPayload>(&body).map_err(|err| {
            SourceError::Malformed {
                message: err.to_string(),
            }
        })?;

        into_question(payload)
    }
}

/// Shuffle the answers and build the question, remembering the correct one by value.
fn into_question(payload: QuestionPayload) -> Result<Question, SourceError> {
    let QuestionPayload {
        question,
        mut answers,
    } = payload;

    if answers.len() != OPTION_COUNT {
        return Err(SourceError::Malformed {
            message: format!(
                "expected {OPTION_COUNT} answers, got {}",
                answers.len()
            ),
        });
    }
    let correct = answers[0].clone();

    answers.shuffle(&mut rand::rng());
    Ok(Question::new(question, answers, correct)?)
}

impl QuestionSource for RemoteQuestionSource {
    fn name(&self) -> &str {
        "remote"
    }

    fn fetch(&self, difficulty: Difficulty) -> BoxFuture<'static, Result<Question, SourceError>> {
        let source = self.clone();
        Box::pin(async move { source.request(difficulty).await })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[derive(Deserialize)]
    struct Params {
        complexity: u8,
    }

    async fn serve(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn source_for(addr: SocketAddr, timeout: Duration) -> RemoteQuestionSource {
        RemoteQuestionSource::new(format!("http://{addr}/api/millionaire"), timeout).unwrap()
    }

    #[tokio::test]
    async fn first_answer_stays_correct_after_shuffle() {
        let router = Router::new().route(
            "/api/millionaire",
            get(|Query(params): Query<Params>| async move {
                Json(json!({
                    "question": format!("Level {} question", params.complexity),
                    "answers": ["right", "wrong 1", "wrong 2", "wrong 3"],
                }))
            }),
        );
        let source = source_for(serve(router).await, TIMEOUT);

        let question = source.fetch(Difficulty::Hard).await.unwrap();
        assert_eq!(question.prompt(), "Level 3 question");
        assert_eq!(question.correct_option(), "right");
        let mut options = question.options().to_vec();
        options.sort();
        assert_eq!(options, vec!["right", "wrong 1", "wrong 2", "wrong 3"]);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let router = Router::new().route(
            "/api/millionaire",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        );
        let source = source_for(serve(router).await, TIMEOUT);

        let err = source.fetch(Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn missing_answers_field_is_malformed() {
        let router = Router::new().route(
            "/api/millionaire",
            get(|| async { Json(json!({"question": "no answers"})) }),
        );
        let source = source_for(serve(router).await, TIMEOUT);

        let err = source.fetch(Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn empty_answers_list_is_malformed() {
        let router = Router::new().route(
            "/api/millionaire",
            get(|| async { Json(json!({"question": "q", "answers": []})) }),
        );
        let source = source_for(serve(router).await, TIMEOUT);

        let err = source.fetch(Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[tokio::test]
    async fn three_answers_are_malformed() {
        let router = Router::new().route(
            "/api/millionaire",
            get(|| async { Json(json!({"question": "q", "answers": ["a", "b", "c"]})) }),
        );
        let source = source_for(serve(router).await, TIMEOUT);

        let err = source.fetch(Difficulty::Easy).await.unwrap_err();
        match err {
            SourceError::Malformed { message } => assert!(message.contains("got 3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let router = Router::new().route(
            "/api/millionaire",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"question": "late", "answers": ["a", "b", "c", "d"]}))
            }),
        );
        let source = source_for(serve(router).await, Duration::from_millis(100));

        let err = source.fetch(Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, SourceError::Request { .. }));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source_for(addr, TIMEOUT)
            .fetch(Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Request { .. }));
    }
}
