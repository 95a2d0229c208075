//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml`, overlaid by `PECUNIA__*`
//! environment variables (e.g. `PECUNIA__SERVER__PORT=8080`).
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use engine::{CatchUp, RetryPolicy};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("pecunia.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Billing {
    /// Seconds between two periodic billing triggers.
    pub interval_secs: u64,
    /// `one_period` or `all_due`.
    pub catch_up: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Retry {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    pub server: Option<Server>,
    pub billing: Option<Billing>,
    pub retry: Option<Retry>,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("PECUNIA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn catch_up(&self) -> Result<CatchUp, ConfigError> {
        match self.billing.as_ref().and_then(|b| b.catch_up.as_deref()) {
            Some(raw) => CatchUp::try_from(raw).map_err(|err| ConfigError::Message(err.to_string())),
            None => Ok(CatchUp::default()),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match &self.retry {
            Some(retry) => RetryPolicy {
                max_attempts: retry.max_attempts,
                base_delay: Duration::from_millis(retry.base_delay_ms),
            },
            None => RetryPolicy::default(),
        }
    }
}
