//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use quiz_core::selection::DEFAULT_QUESTION_COUNT;
use std::net::SocketAddr;
use std::str::FromStr;
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
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    /// The chapter that stands for "all knowledge entries".
    pub root_chapter_id: i64,
    pub default_question_count: i64,
    pub chapter_question_count: i64,
    /// `*` allows any origin.
    pub cors_allow_origin: String,
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

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address: SocketAddr = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:9000".parse().ok())?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", Some(5))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Quiz Settings ---
        let root_chapter_id: i64 = parse_or(&lookup, "ROOT_CHAPTER_ID", Some(1))?;
        let default_question_count: i64 = parse_or(
            &lookup,
            "DEFAULT_QUESTION_COUNT",
            Some(DEFAULT_QUESTION_COUNT as i64),
        )?;
        let chapter_question_count: i64 = parse_or(&lookup, "CHAPTER_QUESTION_COUNT", Some(10))?;
        for (name, value) in [
            ("DEFAULT_QUESTION_COUNT", default_question_count),
            ("CHAPTER_QUESTION_COUNT", chapter_question_count),
        ] {
            if value < 0 {
                return Err(ConfigError::InvalidValue(
                    name.to_string(),
                    "must not be negative".to_string(),
                ));
            }
        }

        let cors_allow_origin = lookup("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".to_string());

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            root_chapter_id,
            default_question_count,
            chapter_question_count,
            cors_allow_origin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => default.ok_or_else(|| ConfigError::MissingVar(key.to_string())),
    }
}
