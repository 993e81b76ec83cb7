mod config;
mod error;
mod store;

pub use config::{DEFAULT_KEY, RedisConfig};
pub use error::{RedisDaoError, RedisResult};
pub use store::{RedisSnapshots, RedisStateStore};
