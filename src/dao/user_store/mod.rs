mod file;
mod memory;
mod persistent;
#[cfg(feature = "redis-store")]
pub mod redis;
mod tables;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::{
    dao::storage::StorageError,
    state::{
        UserId,
        difficulty::{Difficulty, InvalidDifficulty},
        question::Question,
    },
};

pub use file::{FileSnapshots, FileStateStore};
pub use memory::MemoryStateStore;
pub use persistent::{PersistentStateStore, SnapshotBackend};
pub use tables::UserTables;

/// Result alias for state store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by [`StateStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Rejected before any mutation took place.
    #[error(transparent)]
    InvalidDifficulty(#[from] InvalidDifficulty),
    /// The mutation could not be made durable and was rolled back.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What happened to a reply scored by [`StateStore::score_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// No question was pending; nothing changed.
    NoPendingQuestion,
    /// The reply matched none of the options; the question stays pending.
    NotAnOption(Question),
    /// The reply was counted as a win or a loss and the question was closed.
    Scored {
        correct: bool,
        correct_answer: String,
    },
}

/// Per-user game state: pending question, difficulty and win/loss tally.
///
/// Users are created implicitly on first access and read as defaults until
/// something is written for them. Each operation is atomic; an operation that
/// changes several fields is applied and persisted as one write.
pub trait StateStore: Send + Sync {
    /// The question awaiting an answer, if any.
    fn pending_question(&self, user: UserId) -> BoxFuture<'static, StoreResult<Option<Question>>>;
    /// Replace the pending question.
    fn put_pending_question(
        &self,
        user: UserId,
        question: Question,
    ) -> BoxFuture<'static, StoreResult<()>>;
    /// Make `question` pending unless another one already is, and return the
    /// question pending afterwards.
    fn offer_pending_question(
        &self,
        user: UserId,
        question: Question,
    ) -> BoxFuture<'static, StoreResult<Question>>;
    /// Drop the pending question; a no-op when there is none.
    fn clear_pending_question(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>>;
    /// Preferred difficulty, [`Difficulty::Easy`] until one is set.
    fn difficulty(&self, user: UserId) -> BoxFuture<'static, StoreResult<Difficulty>>;
    /// Store a difficulty level; values outside 1..=3 are rejected without any change.
    fn set_difficulty(&self, user: UserId, level: u8) -> BoxFuture<'static, StoreResult<()>>;
    /// Questions answered correctly, 0 for a new user.
    fn wins(&self, user: UserId) -> BoxFuture<'static, StoreResult<u64>>;
    /// Questions answered wrongly, 0 for a new user.
    fn losses(&self, user: UserId) -> BoxFuture<'static, StoreResult<u64>>;
    /// Add one win.
    fn record_win(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>>;
    /// Add one loss.
    fn record_loss(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>>;
    /// Match `reply` against the pending question and, when it names an
    /// option, count the win or loss and close the question in one write.
    fn score_answer(
        &self,
        user: UserId,
        reply: String,
    ) -> BoxFuture<'static, StoreResult<AnswerOutcome>>;
}
