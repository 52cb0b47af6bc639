//! Configuration loading
//!
//! `config.toml` is optional; every field has a default so a bare install
//! talks to a backend on `http://localhost:8000`.

pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use schema::{normalize_prefix, parse_duration, parse_origin};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub guide: GuideConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Scheme + host + port of the backend. Media paths are resolved against it.
    pub origin: String,
    /// Prefix of the render / tts / clone-voice routes.
    pub api_prefix: String,
    /// Prefix of the `/agent/*` routes.
    pub agent_prefix: String,
    /// Per-request timeout; rendering waits for the full lip-sync pipeline.
    pub request_timeout: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".to_string(),
            api_prefix: "/v1".to_string(),
            agent_prefix: String::new(),
            request_timeout: "5m".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Route reported as `current_page` before any navigation.
    pub start_page: String,
    /// Placeholder shown while the transcript is empty.
    pub greeting: String,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            start_page: "/".to_string(),
            greeting: "Hi! Ask me to \"Sign you up\" or \"Log in\".".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Resolved backend endpoints, validated once at startup.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub origin: Url,
    pub api_base: String,
    pub agent_base: String,
    pub timeout: Duration,
}

impl Config {
    /// Load from an explicit path, or from the default location if `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `<config dir>/interactgen/config.toml` for the current platform.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "interactgen").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let origin = parse_origin(&self.backend.origin).map_err(|reason| ConfigError::Invalid {
            field: "backend.origin",
            reason,
        })?;
        let timeout =
            parse_duration(&self.backend.request_timeout).map_err(|reason| ConfigError::Invalid {
                field: "backend.request_timeout",
                reason,
            })?;

        let root = origin.as_str().trim_end_matches('/');
        Ok(Endpoints {
            api_base: format!("{}{}", root, normalize_prefix(&self.backend.api_prefix)),
            agent_base: format!("{}{}", root, normalize_prefix(&self.backend.agent_prefix)),
            origin,
            timeout,
        })
    }
}
