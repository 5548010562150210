//! Configuration
//!
//! Settings shared by every CLI command, read from flags, the environment and
//! an optional `.env` file.

use clap::Args;

use crate::domain::carts::IndexOptions;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Record store connection settings.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Redis connection string
    #[arg(
        long,
        env = "REDIS_URL",
        default_value = "redis://127.0.0.1:6379",
        hide_env_values = true,
        global = true
    )]
    pub redis_url: String,
}

/// Index maintenance settings.
#[derive(Debug, Clone, Args)]
pub struct IndexConfig {
    /// Leave a cart listed under a user, guid or site it no longer has when
    /// those change between saves
    #[arg(long, env = "LEGACY_INDEX_UPDATES", global = true)]
    pub legacy_index_updates: bool,
}

impl IndexConfig {
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            relocate_stale_entries: !self.legacy_index_updates,
        }
    }
}

/// Everything a command needs before it can talk to the store.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    #[command(flatten)]
    pub store: StoreConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(flatten)]
    pub index: IndexConfig,
}

/// Load `.env` into the process environment, if present.
pub fn load_dotenv() {
    _ = dotenvy::dotenv();
}
