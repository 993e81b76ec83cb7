/// Key holding the snapshot when none is configured.
pub const DEFAULT_KEY: &str = "millionaire-bot.data";

/// Runtime configuration describing where the snapshot lives in Redis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: String,
    pub key: String,
}

impl RedisConfig {
    /// Construct a configuration for `url` using [`DEFAULT_KEY`].
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: DEFAULT_KEY.to_string(),
        }
    }

    /// Store the snapshot under `key` instead of [`DEFAULT_KEY`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}
