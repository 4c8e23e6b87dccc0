//! Environment-sourced configuration.
//!
//! Built once at startup and passed into handlers by reference — never
//! read again as ambient global state while a job is running.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::resolver::ResolveOptions;

/// Default sources-API base when `ANIWATCH_API_BASE` is unset
pub const DEFAULT_API_BASE: &str = "http://localhost:4000/api/v2/hianime";

/// Default output directory when `DOWNLOAD_DIR` is unset
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Configuration errors are fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TELOXIDE_TOKEN environment variable not set")]
    MissingToken,

    #[error("invalid BOT_API_URL: {0}")]
    InvalidBotApiUrl(url::ParseError),
}

/// Bot configuration, resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (required)
    pub bot_token: String,
    /// Local Bot API server base for >50 MB uploads; teloxide appends the
    /// `/bot{token}` path itself
    pub bot_api_url: Option<Url>,
    /// Base URL of the episode-sources API
    pub api_base: String,
    /// Directory the remuxed files land in
    pub download_dir: PathBuf,
    /// Server/category passed through to the sources API
    pub resolve: ResolveOptions,
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("TELOXIDE_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let bot_api_url = match lookup("BOT_API_URL") {
            Some(raw) => Some(Url::parse(&raw).map_err(ConfigError::InvalidBotApiUrl)?),
            None => None,
        };

        let api_base = lookup("ANIWATCH_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let download_dir = PathBuf::from(lookup("DOWNLOAD_DIR").unwrap_or_else(|| DEFAULT_DOWNLOAD_DIR.to_string()));

        let defaults = ResolveOptions::default();
        let resolve = ResolveOptions {
            server: lookup("ANIWATCH_SERVER").unwrap_or(defaults.server),
            category: lookup("ANIWATCH_CATEGORY").unwrap_or(defaults.category),
        };

        Ok(Self {
            bot_token,
            bot_api_url,
            api_base,
            download_dir,
            resolve,
        })
    }
}
