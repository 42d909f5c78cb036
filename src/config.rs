use anyhow::{Context, Result};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use tracing::info;

use crate::freshness::{ExpiryWindow, DEFAULT_WINDOW_DAYS};

/// Process configuration, read once from the environment at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub expiry_window_days: u32,
    pub log_json: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            db_path: try_load(&lookup, "ZWK_DB_PATH", "zero_waste_kitchen.db")?,
            host: try_load(&lookup, "ZWK_HOST", "0.0.0.0")?,
            port: try_load(&lookup, "ZWK_PORT", "5000")?,
            expiry_window_days: try_load(
                &lookup,
                "ZWK_EXPIRY_WINDOW_DAYS",
                &DEFAULT_WINDOW_DAYS.to_string(),
            )?,
            log_json: try_load(&lookup, "ZWK_LOG_JSON", "false")?,
        })
    }

    pub fn expiry_window(&self) -> ExpiryWindow {
        ExpiryWindow::new(self.expiry_window_days)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw:?}"))
}
