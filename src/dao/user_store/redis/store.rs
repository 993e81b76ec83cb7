use std::sync::Arc;

use futures::future::BoxFuture;
use ::redis::{AsyncCommands, Client, aio::ConnectionManager};

use crate::dao::{
    storage::{StorageError, StorageResult},
    user_store::{PersistentStateStore, SnapshotBackend},
};

use super::{
    config::RedisConfig,
    error::{RedisDaoError, RedisResult},
};

/// Store mirrored to a single Redis key.
pub type RedisStateStore = PersistentStateStore<RedisSnapshots>;

/// Snapshot kept as a JSON string under one Redis key.
#[derive(Clone)]
pub struct RedisSnapshots {
    connection: ConnectionManager,
    key: Arc<str>,
}

impl RedisSnapshots {
    /// Establish a managed connection to Redis.
    pub async fn connect(config: RedisConfig) -> RedisResult<Self> {
        let client =
            Client::open(config.url.as_str()).map_err(|source| RedisDaoError::InvalidUrl { source })?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|source| RedisDaoError::Connect { source })?;

        Ok(Self {
            connection,
            key: Arc::from(config.key),
        })
    }
}

impl RedisStateStore {
    /// Connect to Redis and load the snapshot stored under the configured key.
    pub async fn connect(config: RedisConfig) -> StorageResult<Self> {
        let backend = RedisSnapshots::connect(config).await?;
        Self::open(backend).await
    }
}

impl SnapshotBackend for RedisSnapshots {
    fn describe(&self) -> String {
        format!("redis key `{}`", self.key)
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let mut connection = self.connection.clone();
        let key = self.key.clone();
        Box::pin(async move {
            connection
                .get::<_, Option<String>>(key.as_ref())
                .await
                .map_err(|source| {
                    StorageError::from(RedisDaoError::Read {
                        key: key.to_string(),
                        source,
                    })
                })
        })
    }

    fn save(&self, payload: String) -> BoxFuture<'static, StorageResult<()>> {
        let mut connection = self.connection.clone();
        let key = self.key.clone();
        Box::pin(async move {
            connection
                .set::<_, _, ()>(key.as_ref(), payload)
                .await
                .map_err(|source| {
                    StorageError::from(RedisDaoError::Write {
                        key: key.to_string(),
                        source,
                    })
                })
        })
    }
}
