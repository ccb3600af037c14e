use crate::error::AppError;
use db_pool::env_utils::{env_non_empty, parse_env_with_default};
use dotenvy::dotenv;
use std::time::Duration;

pub const SERVICE_NAME: &str = "chat-relay-service";

/// Where conversations and messages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    /// Process-local store; state is lost on restart.
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModerationConfig {
    /// Classifier endpoint. `None` disables moderation (text passes through).
    pub url: Option<String>,
    /// Upper bound on one classification call; elapsing counts as a failure.
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebSocketConfig {
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub moderation: ModerationConfig,
    pub websocket: WebSocketConfig,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let port = parse_env_with_default("PORT", 8080u16);

        let backend = env_non_empty("STORE_BACKEND").unwrap_or_else(|| "postgres".to_string());
        let store = match backend.to_ascii_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: env_non_empty("DATABASE_URL")
                    .ok_or_else(|| AppError::Config("DATABASE_URL missing".into()))?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND must be `postgres` or `memory`, got `{other}`"
                )))
            }
        };

        let moderation = ModerationConfig {
            url: env_non_empty("MODERATION_URL"),
            timeout: Duration::from_millis(parse_env_with_default(
                "MODERATION_TIMEOUT_MS",
                3000u64,
            )),
        };

        let websocket = WebSocketConfig {
            heartbeat_interval: Duration::from_secs(parse_env_with_default(
                "WS_HEARTBEAT_INTERVAL_SECS",
                5u64,
            )),
            client_timeout: Duration::from_secs(parse_env_with_default(
                "WS_CLIENT_TIMEOUT_SECS",
                30u64,
            )),
        };

        let log_json = env_non_empty("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            port,
            store,
            moderation,
            websocket,
            log_json,
        })
    }

    /// In-memory defaults for tests and local runs.
    pub fn test_defaults() -> Self {
        Self {
            port: 0,
            store: StoreBackend::Memory,
            moderation: ModerationConfig {
                url: None,
                timeout: Duration::from_millis(3000),
            },
            websocket: WebSocketConfig {
                heartbeat_interval: Duration::from_secs(5),
                client_timeout: Duration::from_secs(30),
            },
            log_json: false,
        }
    }
}
