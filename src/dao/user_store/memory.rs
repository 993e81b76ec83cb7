use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::state::{UserId, difficulty::Difficulty, question::Question};

use super::{AnswerOutcome, StateStore, StoreError, StoreResult, UserTables};

/// Volatile store; everything is lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    tables: Arc<Mutex<UserTables>>,
}

impl MemoryStateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T, F>(&self, read: F) -> BoxFuture<'static, StoreResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&UserTables) -> T + Send + 'static,
    {
        let tables = self.tables.clone();
        Box::pin(async move { Ok::<_, StoreError>(read(&*tables.lock().await)) })
    }

    fn write<T, F>(&self, write: F) -> BoxFuture<'static, StoreResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut UserTables) -> StoreResult<T> + Send + 'static,
    {
        let tables = self.tables.clone();
        Box::pin(async move { write(&mut *tables.lock().await) })
    }
}

impl StateStore for MemoryStateStore {
    fn pending_question(&self, user: UserId) -> BoxFuture<'static, StoreResult<Option<Question>>> {
        self.read(move |tables| tables.pending_question(user))
    }

    fn put_pending_question(
        &self,
        user: UserId,
        question: Question,
    ) -> BoxFuture<'static, StoreResult<()>> {
        self.write(move |tables| {
            tables.put_pending_question(user, question);
            Ok(())
        })
    }

    fn offer_pending_question(
        &self,
        user: UserId,
        question: Question,
    ) -> BoxFuture<'static, StoreResult<Question>> {
        self.write(move |tables| Ok(tables.offer_pending_question(user, question)))
    }

    fn clear_pending_question(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>> {
        self.write(move |tables| {
            tables.clear_pending_question(user);
            Ok(())
        })
    }

    fn difficulty(&self, user: UserId) -> BoxFuture<'static, StoreResult<Difficulty>> {
        self.read(move |tables| tables.difficulty(user))
    }

    fn set_difficulty(&self, user: UserId, level: u8) -> BoxFuture<'static, StoreResult<()>> {
        self.write(move |tables| Ok(tables.set_difficulty(user, level)?))
    }

    fn wins(&self, user: UserId) -> BoxFuture<'static, StoreResult<u64>> {
        self.read(move |tables| tables.wins(user))
    }

    fn losses(&self, user: UserId) -> BoxFuture<'static, StoreResult<u64>> {
        self.read(move |tables| tables.losses(user))
    }

    fn record_win(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>> {
        self.write(move |tables| {
            tables.record_win(user);
            Ok(())
        })
    }

    fn record_loss(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>> {
        self.write(move |tables| {
            tables.record_loss(user);
            Ok(())
        })
    }

    fn score_answer(
        &self,
        user: UserId,
        reply: String,
    ) -> BoxFuture<'static, StoreResult<AnswerOutcome>> {
        self.write(move |tables| Ok(tables.score_answer(user, &reply)))
    }
}
