//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use masto_core::IdSpace;
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub instance: InstanceConfig,
    pub compat: CompatConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    #[serde(default)]
    pub log_format: Option<LogFormat>,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Public identity of this instance
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    /// Base URL without trailing slash, e.g. `https://social.example`
    pub url: String,
}

impl InstanceConfig {
    /// Create from a base URL, dropping any trailing slash
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Host part of the base URL
    #[must_use]
    pub fn host(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        rest.split('/').next().unwrap_or(rest)
    }

    /// Generated avatar for users without one
    #[must_use]
    pub fn identicon_url(&self, user_id: &str) -> String {
        format!("{}/identicon/{}", self.url, user_id)
    }

    /// Placeholder header image
    #[must_use]
    pub fn transparent_banner_url(&self) -> String {
        format!("{}/static-assets/transparent.png", self.url)
    }

    /// Canonical page of a local note
    #[must_use]
    pub fn note_url(&self, note_id: &str) -> String {
        format!("{}/notes/{}", self.url, note_id)
    }

    /// Profile page of a user, local or remote
    #[must_use]
    pub fn profile_url(&self, username: &str, host: Option<&str>) -> String {
        match host {
            Some(host) => format!("https://{host}/@{username}"),
            None => format!("{}/@{}", self.url, username),
        }
    }

    /// Hashtag page
    #[must_use]
    pub fn tag_url(&self, tag: &str) -> String {
        format!("{}/tags/{}", self.url, tag)
    }
}

/// Mastodon API compatibility settings
#[derive(Debug, Clone, Deserialize)]
pub struct CompatConfig {
    /// Id space clients see
    #[serde(default)]
    pub id_space: IdSpace,
    /// Restrict the public timeline to admins and moderators
    #[serde(default)]
    pub disable_global_timeline: bool,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            id_space: IdSpace::default(),
            disable_global_timeline: false,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "masto-compat".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            None => default_env(),
            Some(s) => match s.to_lowercase().as_str() {
                "production" => Environment::Production,
                "staging" => Environment::Staging,
                "development" => Environment::Development,
                _ => return Err(ConfigError::InvalidValue("APP_ENV", s)),
            },
        };

        let log_format = match lookup("LOG_FORMAT") {
            None => None,
            Some(s) => Some(match s.to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidValue("LOG_FORMAT", s)),
            }),
        };

        let url = lookup("INSTANCE_URL").ok_or(ConfigError::MissingVar("INSTANCE_URL"))?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue("INSTANCE_URL", url));
        }

        let id_space = match lookup("MASTODON_ID_SPACE") {
            None => IdSpace::default(),
            Some(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MASTODON_ID_SPACE", s))?,
        };

        let disable_global_timeline = match lookup("DISABLE_GLOBAL_TIMELINE") {
            None => false,
            Some(s) => parse_bool(&s)
                .ok_or(ConfigError::InvalidValue("DISABLE_GLOBAL_TIMELINE", s))?,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
                log_format,
            },
            instance: InstanceConfig::new(url),
            compat: CompatConfig {
                id_space,
                disable_global_timeline,
            },
        })
    }

    /// Minimal configuration for an instance URL, everything else defaulted
    pub fn for_instance(url: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
                log_format: None,
            },
            instance: InstanceConfig::new(url),
            compat: CompatConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
