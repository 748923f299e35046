use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use url::Url;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "/api";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute URL, or a path resolved against `app_origin`.
    pub api_url: String,
    pub app_origin: String,
    pub request_timeout_seconds: u64,
    pub max_file_size_mb: usize,
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            request_timeout_seconds: 300,
            max_file_size_mb: 10,
            download_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let defaults = Config::default();
        let config = Config {
            api_url: env::var("OCR_API_URL").unwrap_or_else(|_| {
                info!("OCR_API_URL not set, using default: {}", DEFAULT_API_URL);
                defaults.api_url.clone()
            }),
            app_origin: env::var("APP_ORIGIN").unwrap_or_else(|_| defaults.app_origin.clone()),
            request_timeout_seconds: Self::parse_env_var(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )
            .context("Failed to parse REQUEST_TIMEOUT_SECONDS")?,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            download_dir: env::var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.request_timeout_seconds == 0 {
            return Err(AppError::config("REQUEST_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(AppError::config("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        self.api_base_url()?;
        Ok(())
    }

    /// Resolves the API base once, without a trailing slash.
    pub fn api_base_url(&self) -> AppResult<Url> {
        let raw = self.api_url.trim();
        let mut url = if raw.starts_with("http://") || raw.starts_with("https://") {
            Url::parse(raw)
                .map_err(|e| AppError::config(format!("Invalid OCR_API_URL {}: {}", raw, e)))?
        } else {
            let origin = Url::parse(&self.app_origin).map_err(|e| {
                AppError::config(format!("Invalid APP_ORIGIN {}: {}", self.app_origin, e))
            })?;
            origin
                .join(raw)
                .map_err(|e| AppError::config(format!("Invalid OCR_API_URL {}: {}", raw, e)))?
        };

        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }
}
