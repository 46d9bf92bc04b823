//! Configuration management for the Truyen client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default comic catalog API
pub const DEFAULT_COMIC_API_URL: &str = "https://otruyenapi.com/v1/api";
/// Default image CDN, used when a response carries no CDN domain
pub const DEFAULT_CDN_URL: &str = "https://img.otruyenapi.com";
/// Delay before the reader shows every page regardless of load events
pub const DEFAULT_READER_FALLBACK_MS: u64 = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub reader: ReaderConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Comic catalog backend
    pub comic_url: String,
    /// Account backend (login, profile, reading list, favorites)
    pub auth_url: String,
    /// Fallback CDN base for image URLs
    pub cdn_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReaderConfig {
    pub fallback_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File backing the persisted token/profile; `None` keeps them in memory
    pub file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api: ApiConfig {
                comic_url: DEFAULT_COMIC_API_URL.to_string(),
                auth_url: "http://localhost:5000".to_string(),
                cdn_url: DEFAULT_CDN_URL.to_string(),
                timeout_secs: 30,
            },
            reader: ReaderConfig {
                fallback_delay_ms: DEFAULT_READER_FALLBACK_MS,
            },
            session: SessionConfig { file: None },
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ClientConfig {
            api: ApiConfig {
                comic_url: env::var("COMIC_API_URL")
                    .unwrap_or_else(|_| DEFAULT_COMIC_API_URL.to_string()),
                auth_url: env::var("AUTH_API_URL")
                    .unwrap_or_else(|_| "http://localhost:5000".to_string()),
                cdn_url: env::var("CDN_IMAGE_URL").unwrap_or_else(|_| DEFAULT_CDN_URL.to_string()),
                timeout_secs: parse_var("HTTP_TIMEOUT_SECS", 30)?,
            },
            reader: ReaderConfig {
                fallback_delay_ms: parse_var("READER_FALLBACK_MS", DEFAULT_READER_FALLBACK_MS)?,
            },
            session: SessionConfig {
                file: env::var("SESSION_FILE").ok().map(PathBuf::from),
            },
        })
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ReaderConfig {
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            fallback_delay_ms: DEFAULT_READER_FALLBACK_MS,
        }
    }
}

fn parse_var(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}
