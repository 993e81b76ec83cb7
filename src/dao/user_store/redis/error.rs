//! Error types shared by the Redis snapshot backend.

use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`RedisDaoError`] failures.
pub type RedisResult<T> = Result<T, RedisDaoError>;

/// Failures that can occur while interacting with Redis.
#[derive(Debug, Error)]
pub enum RedisDaoError {
    /// The connection URL could not be parsed.
    #[error("invalid Redis URL")]
    InvalidUrl {
        #[source]
        source: ::redis::RedisError,
    },
    /// The initial connection could not be established.
    #[error("failed to connect to Redis")]
    Connect {
        #[source]
        source: ::redis::RedisError,
    },
    /// Reading the snapshot key failed.
    #[error("failed to read Redis key `{key}`")]
    Read {
        key: String,
        #[source]
        source: ::redis::RedisError,
    },
    /// Writing the snapshot key failed.
    #[error("failed to write Redis key `{key}`")]
    Write {
        key: String,
        #[source]
        source: ::redis::RedisError,
    },
}

impl From<RedisDaoError> for StorageError {
    fn from(err: RedisDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
