//! Application-level configuration loading: listening port, storage backend and question sources.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the bot looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/bot.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MILLIONAIRE_BOT_CONFIG_PATH";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_FILE: &str = "storage.json";
/// Public question API used when nothing else is configured.
pub const DEFAULT_QUESTION_ENDPOINT: &str = "https://stepik.akentev.com/api/millionaire";
/// Upper bound on a single question API request.
pub const DEFAULT_QUESTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Where per-user state is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Keep state in memory only.
    None,
    /// Mirror state to a JSON file.
    File { path: PathBuf },
    /// Mirror state to a Redis key; `key` falls back to the backend default.
    Redis { url: String, key: Option<String> },
}

/// Remote question API settings; `None` in [`AppConfig::remote_questions`] disables it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteQuestionsConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration resolved once at startup.
pub struct AppConfig {
    pub port: u16,
    pub storage: StorageConfig,
    pub remote_questions: Option<RemoteQuestionsConfig>,
}

impl AppConfig {
    /// Load the configuration from disk and apply environment overrides,
    /// falling back to built-in defaults when the file is missing or invalid.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded bot configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_env_overrides(|name| env::var(name).ok())
    }

    /// Parse the JSON configuration file format.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Apply `REDIS_URL`/`REDIS_KEY`, `STORAGE_FILE`, `QUESTION_API_URL` and
    /// `PORT` (or `SERVER_PORT`) from `lookup`. A Redis URL wins over a storage file.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = var("REDIS_URL") {
            self.storage = StorageConfig::Redis {
                url,
                key: var("REDIS_KEY"),
            };
        } else if let Some(path) = var("STORAGE_FILE") {
            self.storage = StorageConfig::File {
                path: PathBuf::from(path),
            };
        }

        if let Some(endpoint) = var("QUESTION_API_URL") {
            let timeout = self
                .remote_questions
                .as_ref()
                .map_or(DEFAULT_QUESTION_TIMEOUT, |remote| remote.timeout);
            self.remote_questions = Some(RemoteQuestionsConfig { endpoint, timeout });
        }

        if let Some(port) = var("PORT")
            .or_else(|| var("SERVER_PORT"))
            .and_then(|value| value.trim().parse::<u16>().ok())
        {
            self.port = port;
        }

        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: Option<u16>,
    storage: Option<RawStorage>,
    questions: Option<RawQuestions>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
enum RawStorage {
    None,
    File { path: PathBuf },
    Redis { url: String, key: Option<String> },
}

#[derive(Debug, Deserialize)]
struct RawQuestions {
    #[serde(default = "enabled")]
    remote: bool,
    endpoint: Option<String>,
    timeout_ms: Option<u64>,
}

fn enabled() -> bool {
    true
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let storage = match value.storage {
            None => StorageConfig::File {
                path: PathBuf::from(DEFAULT_STORAGE_FILE),
            },
            Some(RawStorage::None) => StorageConfig::None,
            Some(RawStorage::File { path }) => StorageConfig::File { path },
            Some(RawStorage::Redis { url, key }) => StorageConfig::Redis { url, key },
        };

        let remote_questions = match value.questions {
            None => Some(RemoteQuestionsConfig {
                endpoint: DEFAULT_QUESTION_ENDPOINT.to_string(),
                timeout: DEFAULT_QUESTION_TIMEOUT,
            }),
            Some(RawQuestions { remote: false, .. }) => None,
            Some(RawQuestions {
                endpoint,
                timeout_ms,
                ..
            }) => Some(RemoteQuestionsConfig {
                endpoint: endpoint.unwrap_or_else(|| DEFAULT_QUESTION_ENDPOINT.to_string()),
                timeout: timeout_ms.map_or(DEFAULT_QUESTION_TIMEOUT, Duration::from_millis),
            }),
        };

        Self {
            port: value.port.unwrap_or(DEFAULT_PORT),
            storage,
            remote_questions,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
