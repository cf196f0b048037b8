//! services/portal/src/config.rs
//!
//! Defines the portal's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// The session secret must be at least this long to sign cookies with HMAC-SHA256.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub graphql_api_url: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub api_token: Option<String>,
    pub upload_dir: PathBuf,
    pub asset_base_url: Option<String>,
    pub cors_origin: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Server ---
        let bind_address_str =
            non_empty("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = non_empty("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            non_empty("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- GraphQL Backend ---
        let graphql_api_url = non_empty("GRAPHQL_API_URL")
            .ok_or_else(|| ConfigError::MissingVar("GRAPHQL_API_URL".to_string()))?;
        if !graphql_api_url.starts_with("http://") && !graphql_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "GRAPHQL_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", graphql_api_url),
            ));
        }
        let api_token = non_empty("API_TOKEN");

        // --- Sessions ---
        let session_secret = non_empty("SESSION_SECRET")
            .ok_or_else(|| ConfigError::MissingVar("SESSION_SECRET".to_string()))?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "SESSION_SECRET".to_string(),
                format!("must be at least {MIN_SESSION_SECRET_LEN} bytes long"),
            ));
        }
        let session_ttl_hours = match non_empty("SESSION_TTL_HOURS") {
            None => 720,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "SESSION_TTL_HOURS".to_string(),
                        format!("'{}' is not a positive number of hours", raw),
                    )
                })?,
        };

        // --- Assets ---
        let upload_dir = non_empty("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./public/images"));
        let asset_base_url =
            non_empty("ASSET_BASE_URL").map(|url| url.trim_end_matches('/').to_string());

        Ok(Self {
            bind_address,
            graphql_api_url,
            session_secret,
            session_ttl_hours,
            api_token,
            upload_dir,
            asset_base_url,
            cors_origin,
            log_level,
        })
    }
}
