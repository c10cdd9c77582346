//! Environment configuration for the relay server and the CLI.
//!
//! Everything is optional. `from_lookup` takes the variable source as a
//! function so tests never touch the process environment.

use std::path::PathBuf;

use thiserror::Error;

use crate::client::DEFAULT_BACKEND_URL;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STATE_DIR: &str = ".farm_planner";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT '{0}': expected an integer between 0 and 65535")]
    InvalidPort(String),
}

/// Deployment mode. Only `production` restricts CORS and only
/// `development` exposes panic details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Production,
    Development,
    #[default]
    Other,
}

impl RunMode {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "production" => RunMode::Production,
            "development" => RunMode::Development,
            _ => RunMode::Other,
        }
    }

    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }

    pub fn is_development(self) -> bool {
        self == RunMode::Development
    }
}

/// Relay server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// ML backend base URL
    pub backend_url: String,
    pub allowed_origins: Vec<String>,
    /// PostgreSQL connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub mode: RunMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            database_url: None,
            mode: RunMode::default(),
        }
    }
}

/// Non-empty value of a variable.
fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match non_empty(&lookup, "PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let allowed_origins = match non_empty(&lookup, "ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => defaults.allowed_origins,
        };

        let mode = non_empty(&lookup, "APP_ENV")
            .or_else(|| non_empty(&lookup, "NODE_ENV"))
            .map(|m| RunMode::parse(&m))
            .unwrap_or_default();

        Ok(Self {
            port,
            backend_url: non_empty(&lookup, "FASTAPI_URL").unwrap_or(defaults.backend_url),
            allowed_origins,
            database_url: non_empty(&lookup, "DATABASE_URL"),
            mode,
        })
    }

    /// Whether a browser origin may call the API.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        !self.mode.is_production() || self.allowed_origins.iter().any(|o| o == origin)
    }
}

/// Terminal front-end configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub backend_url: String,
    /// Relay server used for saved plans
    pub server_url: String,
    pub state_dir: PathBuf,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            backend_url: non_empty(&lookup, "FASTAPI_URL")
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            server_url: non_empty(&lookup, "FARM_PLANNER_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            state_dir: non_empty(&lookup, "FARM_PLANNER_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR)),
        }
    }
}
