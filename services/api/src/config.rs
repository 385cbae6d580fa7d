//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

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
    pub log_level: Level,
    /// When set, saved roadmaps live in Postgres instead of `store_path`.
    pub database_url: Option<String>,
    pub store_path: PathBuf,
    pub openai_api_key: Option<String>,
    pub roadmap_model: String,
    pub roadmap_temperature: f32,
    pub roadmap_max_tokens: u32,
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            database_url: None,
            store_path: PathBuf::from("./data"),
            openai_api_key: None,
            roadmap_model: "gpt-4o-mini".to_string(),
            roadmap_temperature: 0.35,
            roadmap_max_tokens: 4096,
            cors_origin: "http://localhost:5173".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
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
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = parse_var("BIND_ADDRESS", defaults.bind_address)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Storage Settings ---
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let store_path = std::env::var("STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        // --- Generation Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let roadmap_model = std::env::var("ROADMAP_MODEL").unwrap_or(defaults.roadmap_model);
        let roadmap_temperature = parse_var("ROADMAP_TEMPERATURE", defaults.roadmap_temperature)?;
        let roadmap_max_tokens = parse_var("ROADMAP_MAX_TOKENS", defaults.roadmap_max_tokens)?;

        Ok(Self {
            bind_address,
            log_level,
            database_url,
            store_path,
            openai_api_key,
            roadmap_model,
            roadmap_temperature,
            roadmap_max_tokens,
            cors_origin,
        })
    }

    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_and_reports_bad_values() {
        std::env::remove_var("ROADMAP_TEST_UNSET");
        assert_eq!(parse_var("ROADMAP_TEST_UNSET", 7u32).unwrap(), 7);

        std::env::set_var("ROADMAP_TEST_BAD", "many");
        let err = parse_var("ROADMAP_TEST_BAD", 7u32).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "ROADMAP_TEST_BAD"));

        std::env::set_var("ROADMAP_TEST_GOOD", "0.5");
        assert_eq!(parse_var("ROADMAP_TEST_GOOD", 0.1f32).unwrap(), 0.5);
    }

    #[test]
    fn missing_api_key_is_reported_by_name() {
        let config = Config::default();
        let err = config.require_openai_api_key().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
