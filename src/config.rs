use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, error};

use crate::collab::CollabSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port, shared by the API and the collaboration WebSocket
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_service_name")]
    pub cloud_service_name: String,

    /// Database URL
    pub db_url: Option<String>,

    /// Maximum live connections per room
    #[serde(default = "default_room_capacity")]
    pub room_capacity: usize,

    /// Quiet period before a burst of edits is written back
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Upper bound on how long continuous edits may defer a write
    #[serde(default = "default_max_debounce_ms")]
    pub max_debounce_ms: u64,

    /// Name of the root text container holding the file content
    #[serde(default = "default_text_field")]
    pub text_field: String,

    #[serde(default = "default_gc_interval_secs")]
    pub gc_interval_secs: u64,

    #[serde(default = "default_room_ttl_secs")]
    pub room_ttl_secs: u64,

    #[serde(default = "default_orphan_file_ttl_secs")]
    pub orphan_file_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> String {
        format!(
            "codehaven_collab={0},tower_http={0},axum::rejection=trace,info",
            self.log_level
        )
    }

    /// Parsed CORS origins, empty when unset
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Project the collaboration knobs into the coordinator settings
    pub fn collab_settings(&self) -> CollabSettings {
        CollabSettings {
            room_capacity: self.room_capacity,
            debounce: Duration::from_millis(self.debounce_ms),
            max_debounce: Duration::from_millis(self.max_debounce_ms),
            text_field: self.text_field.clone(),
            gc_interval: Duration::from_secs(self.gc_interval_secs),
            room_ttl: Duration::from_secs(self.room_ttl_secs),
            orphan_file_ttl: Duration::from_secs(self.orphan_file_ttl_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            cloud_service_name: default_service_name(),
            db_url: None,
            room_capacity: default_room_capacity(),
            debounce_ms: default_debounce_ms(),
            max_debounce_ms: default_max_debounce_ms(),
            text_field: default_text_field(),
            gc_interval_secs: default_gc_interval_secs(),
            room_ttl_secs: default_room_ttl_secs(),
            orphan_file_ttl_secs: default_orphan_file_ttl_secs(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1234
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "codehaven-collab".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_room_capacity() -> usize {
    2
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_max_debounce_ms() -> u64 {
    10_000
}

fn default_text_field() -> String {
    "codemirror".to_string()
}

fn default_gc_interval_secs() -> u64 {
    60 * 60
}

fn default_room_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_orphan_file_ttl_secs() -> u64 {
    60 * 60
}
