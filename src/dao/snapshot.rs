//! JSON snapshot of every tracked user's state, shared by the file and Redis stores.
//!
//! The layout keeps four top-level maps keyed by user id so that snapshots
//! written by earlier versions of the bot keep loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

use crate::{
    dao::{user_map, user_store::UserTables},
    state::{
        UserId,
        difficulty::Difficulty,
        question::{Question, QuestionError},
    },
};

/// Failures raised while converting between a snapshot and in-memory tables.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload is not valid JSON or does not have the snapshot shape.
    #[error("malformed snapshot JSON")]
    Json(#[from] serde_json::Error),
    /// A stored pending question no longer passes validation.
    #[error("stored question for user {user} is invalid")]
    InvalidQuestion {
        user: UserId,
        #[source]
        source: QuestionError,
    },
    /// A stored difficulty is not one of the allowed levels.
    #[error("stored difficulty `{value}` for user {user} is invalid")]
    InvalidDifficulty { user: UserId, value: String },
}

/// Serialized form of [`UserTables`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "user_current_questions", default, with = "user_map")]
    pending_questions: BTreeMap<UserId, QuestionRecord>,
    #[serde(rename = "user_complexity", default, with = "user_map")]
    difficulties: BTreeMap<UserId, StoredLevel>,
    #[serde(rename = "user_victories", default, with = "user_map")]
    wins: BTreeMap<UserId, u64>,
    #[serde(rename = "user_defeats", default, with = "user_map")]
    losses: BTreeMap<UserId, u64>,
}

/// Plain record for a pending question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

/// Older snapshots store the level as a numeral string, newer tools may write a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredLevel {
    Numeral(String),
    Number(u64),
}

impl Snapshot {
    /// Capture the full content of `tables`.
    pub fn encode(tables: &UserTables) -> Self {
        Self {
            pending_questions: tables
                .pending_questions
                .iter()
                .map(|(user, question)| (*user, question.into()))
                .collect(),
            difficulties: tables
                .difficulties
                .iter()
                .map(|(user, difficulty)| (*user, StoredLevel::Numeral(difficulty.to_string())))
                .collect(),
            wins: tables.wins.iter().map(|(user, count)| (*user, *count)).collect(),
            losses: tables
                .losses
                .iter()
                .map(|(user, count)| (*user, *count))
                .collect(),
        }
    }

    /// Rebuild tables, re-validating every stored question and difficulty.
    pub fn decode(self) -> Result<UserTables, SnapshotError> {
        let pending_questions = self
            .pending_questions
            .into_iter()
            .map(|(user, record)| {
                Question::try_from(record)
                    .map(|question| (user, question))
                    .map_err(|source| SnapshotError::InvalidQuestion { user, source })
            })
            .collect::<Result<_, _>>()?;

        let difficulties = self
            .difficulties
            .into_iter()
            .map(|(user, stored)| stored.into_difficulty(user).map(|level| (user, level)))
            .collect::<Result<_, _>>()?;

        Ok(UserTables {
            pending_questions,
            difficulties,
            wins: self.wins.into_iter().collect(),
            losses: self.losses.into_iter().collect(),
        })
    }

    /// Parse a snapshot from its JSON text.
    pub fn from_json_str(payload: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Render the snapshot as indented JSON, leaving non-ASCII text unescaped.
    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        let mut buffer = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)?;
        // serde_json only emits valid UTF-8.
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl StoredLevel {
    fn into_difficulty(self, user: UserId) -> Result<Difficulty, SnapshotError> {
        let value = match &self {
            StoredLevel::Numeral(text) => text.trim().parse::<u8>().ok(),
            StoredLevel::Number(number) => u8::try_from(*number).ok(),
        };

        value
            .and_then(|level| Difficulty::try_from(level).ok())
            .ok_or_else(|| SnapshotError::InvalidDifficulty {
                user,
                value: match self {
                    StoredLevel::Numeral(text) => text,
                    StoredLevel::Number(number) => number.to_string(),
                },
            })
    }
}

impl From<&Question> for QuestionRecord {
    fn from(question: &Question) -> Self {
        Self {
            question: question.prompt().to_string(),
            answers: question.options().to_vec(),
            correct_answer: question.correct_option().to_string(),
        }
    }
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Question::new(record.question, record.answers, record.correct_answer)
    }
}
