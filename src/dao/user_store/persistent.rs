use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    dao::{
        snapshot::Snapshot,
        storage::{StorageError, StorageResult},
    },
    state::{UserId, difficulty::Difficulty, question::Question},
};

use super::{AnswerOutcome, StateStore, StoreError, StoreResult, UserTables};

/// Durable home for the serialized snapshot of a [`PersistentStateStore`].
pub trait SnapshotBackend: Send + Sync + 'static {
    /// Human readable location used in logs.
    fn describe(&self) -> String;
    /// Fetch the stored snapshot, `None` when nothing was saved yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Replace the stored snapshot.
    fn save(&self, payload: String) -> BoxFuture<'static, StorageResult<()>>;
}

/// In-memory tables mirrored to a [`SnapshotBackend`] after every mutation.
///
/// Each mutation and its flush happen under one lock, so the stored snapshot
/// always matches the latest completed write. When the flush fails the
/// mutation is rolled back and the error is returned. A mutation that changes
/// nothing is not flushed. Reads never touch the backend. Every write
/// re-serializes all users.
///
/// Writes run on their own task: a caller that stops waiting does not cancel
/// the flush or the rollback.
pub struct PersistentStateStore<B> {
    inner: Arc<Inner<B>>,
}

struct Inner<B> {
    tables: Mutex<UserTables>,
    backend: B,
}

impl<B> Clone for PersistentStateStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B: SnapshotBackend> PersistentStateStore<B> {
    /// Load any existing snapshot from `backend` and start mirroring to it.
    pub async fn open(backend: B) -> StorageResult<Self> {
        let tables = match backend.load().await? {
            Some(payload) => Snapshot::from_json_str(&payload)?.decode()?,
            None => {
                info!(location = %backend.describe(), "no stored snapshot; starting empty");
                UserTables::default()
            }
        };

        info!(
            location = %backend.describe(),
            users = tables.tracked_users().len(),
            "user state store ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                tables: Mutex::new(tables),
                backend,
            }),
        })
    }

    fn read<T, F>(&self, read: F) -> BoxFuture<'static, StoreResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&UserTables) -> T + Send + 'static,
    {
        let inner = self.inner.clone();
        Box::pin(async move { Ok::<_, StoreError>(read(&*inner.tables.lock().await)) })
    }

    fn write<T, F>(&self, user: UserId, write: F) -> BoxFuture<'static, StoreResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut UserTables) -> StoreResult<T> + Send + 'static,
    {
        let inner = self.inner.clone();
        Box::pin(async move {
            tokio::spawn(async move { apply_and_flush(&inner, user, write).await })
                .await
                .map_err(|err| {
                    StoreError::from(StorageError::unavailable(
                        "user state write task failed".into(),
                        err,
                    ))
                })?
        })
    }
}

async fn apply_and_flush<B, T, F>(inner: &Inner<B>, user: UserId, write: F) -> StoreResult<T>
where
    B: SnapshotBackend,
    F: FnOnce(&mut UserTables) -> StoreResult<T>,
{
    let mut tables = inner.tables.lock().await;
    let previous = tables.clone();
    let value = write(&mut tables)?;
    if *tables == previous {
        return Ok(value);
    }

    if let Err(err) = flush(&inner.backend, &tables).await {
        warn!(
            user,
            location = %inner.backend.describe(),
            error = %err,
            "failed to persist user state; rolling back"
        );
        *tables = previous;
        return Err(err.into());
    }

    debug!(user, "user state persisted");
    Ok(value)
}

async fn flush<B: SnapshotBackend>(backend: &B, tables: &UserTables) -> Result<(), StorageError> {
    let payload = Snapshot::encode(tables).to_json_string()?;
    backend.save(payload).await
}

impl<B: SnapshotBackend> StateStore for PersistentStateStore<B> {
    fn pending_question(&self, user: UserId) -> BoxFuture<'static, StoreResult<Option<Question>>> {
        self.read(move |tables| tables.pending_question(user))
    }

    fn put_pending_question(
        &self,
        user: UserId,
        question: Question,
    ) -> BoxFuture<'static, StoreResult<()>> {
        self.write(user, move |tables| {
            tables.put_pending_question(user, question);
            Ok(())
        })
    }

    fn offer_pending_question(
        &self,
        user: UserId,
        question: Question,
    ) -> BoxFuture<'static, StoreResult<Question>> {
        self.write(user, move |tables| {
            Ok(tables.offer_pending_question(user, question))
        })
    }

    fn clear_pending_question(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>> {
        self.write(user, move |tables| {
            tables.clear_pending_question(user);
            Ok(())
        })
    }

    fn difficulty(&self, user: UserId) -> BoxFuture<'static, StoreResult<Difficulty>> {
        self.read(move |tables| tables.difficulty(user))
    }

    fn set_difficulty(&self, user: UserId, level: u8) -> BoxFuture<'static, StoreResult<()>> {
        self.write(user, move |tables| Ok(tables.set_difficulty(user, level)?))
    }

    fn wins(&self, user: UserId) -> BoxFuture<'static, StoreResult<u64>> {
        self.read(move |tables| tables.wins(user))
    }

    fn losses(&self, user: UserId) -> BoxFuture<'static, StoreResult<u64>> {
        self.read(move |tables| tables.losses(user))
    }

    fn record_win(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>> {
        self.write(user, move |tables| {
            tables.record_win(user);
            Ok(())
        })
    }

    fn record_loss(&self, user: UserId) -> BoxFuture<'static, StoreResult<()>> {
        self.write(user, move |tables| {
            tables.record_loss(user);
            Ok(())
        })
    }

    fn score_answer(
        &self,
        user: UserId,
        reply: String,
    ) -> BoxFuture<'static, StoreResult<AnswerOutcome>> {
        self.write(user, move |tables| Ok(tables.score_answer(user, &reply)))
    }
}
