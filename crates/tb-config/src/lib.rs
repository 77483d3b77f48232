//! # tb-config
//!
//! Layered process configuration for the textboard.
//!
//! Sources, highest priority last:
//! 1. Built-in defaults
//! 2. `config/default.toml`, or the file named by `TEXTBOARD_CONFIG` (optional)
//! 3. Environment variables (`TEXTBOARD__` prefix, `__` as separator),
//!    e.g. `TEXTBOARD__STORE__BACKEND=redis`
//!
//! A `.env` file in the working directory is loaded first when present.

mod error;

pub use error::ConfigError;

use std::collections::HashSet;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;
use tb_core::{Board, BoardRegistry, PostLimits, DEFAULT_PREVIEW_REPLIES};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "TEXTBOARD";
/// Upper bound on `listing.preview_replies`.
pub const MAX_PREVIEW_REPLIES: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub limits: PostLimits,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub boards: Vec<BoardConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads; `None` lets actix pick one per core.
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// e.g. `redis://:password@localhost:6379/1`. Never logged.
    pub redis_url: Option<SecretString>,
    pub pool_size: usize,
    /// Upper bound on any single store call before it reports unavailable.
    pub op_timeout_ms: u64,
}

impl StoreConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: None,
            pool_size: 16,
            op_timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Highest 1-based page number the router serves.
    pub max_pages: usize,
    /// Trailing replies shown under each thread on a listing page.
    pub preview_replies: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            preview_replies: DEFAULT_PREVIEW_REPLIES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit newline-delimited JSON instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_threads_per_page")]
    pub threads_per_page: usize,
}

fn default_threads_per_page() -> usize {
    10
}

impl From<&BoardConfig> for Board {
    fn from(c: &BoardConfig) -> Self {
        Board {
            slug: c.slug.clone(),
            title: c.title.clone(),
            description: c.description.clone(),
            threads_per_page: c.threads_per_page,
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then every layer, then validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let path = std::env::var(format!("{ENV_PREFIX}_CONFIG"))
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let raw = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(Self::environment())
            .build()?;
        Self::finish(raw)
    }

    /// Parses a TOML document with environment overrides applied on top.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let raw = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(Self::environment())
            .build()?;
        Self::finish(raw)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true)
    }

    fn finish(raw: Config) -> Result<Self, ConfigError> {
        let cfg: AppConfig = raw.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boards.is_empty() {
            return Err(ConfigError::invalid("boards", "at least one board must be configured"));
        }
        let mut seen = HashSet::new();
        for board in &self.boards {
            if board.slug.is_empty() || !board.slug.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::invalid(
                    "boards.slug",
                    format!("{:?} must be non-empty ASCII alphanumerics", board.slug),
                ));
            }
            if !seen.insert(board.slug.as_str()) {
                return Err(ConfigError::invalid("boards.slug", format!("duplicate board {:?}", board.slug)));
            }
            if board.threads_per_page == 0 {
                return Err(ConfigError::invalid(
                    "boards.threads_per_page",
                    format!("board {:?} must show at least one thread per page", board.slug),
                ));
            }
        }
        if self.listing.max_pages == 0 {
            return Err(ConfigError::invalid("listing.max_pages", "must be at least 1"));
        }
        if self.listing.preview_replies > MAX_PREVIEW_REPLIES {
            return Err(ConfigError::invalid(
                "listing.preview_replies",
                format!("must be at most {MAX_PREVIEW_REPLIES}"),
            ));
        }
        if self.store.backend == StoreBackend::Redis && self.store.redis_url.is_none() {
            return Err(ConfigError::invalid("store.redis_url", "required when store.backend = \"redis\""));
        }
        if self.store.op_timeout_ms == 0 {
            return Err(ConfigError::invalid("store.op_timeout_ms", "must be positive"));
        }
        Ok(())
    }

    pub fn board_registry(&self) -> BoardRegistry {
        BoardRegistry::new(self.boards.iter().map(Board::from).collect())
    }
}
