//! # Configuration Management Module
//!
//! Loads and validates the bot's TOML configuration.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - bot name, administrator allow-list, blocklist seed, pacing and listing limits
//! - [`LoggingConfig`] - log level and optional log files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use utilbot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load("config.toml").await?;
//!     config.apply_env_overrides()?;
//!     config.validate()?;
//!     println!("Admins: {:?}", config.bot.admins);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "Utility Bot"
//! admins = [123456789]
//! blocked = []
//! broadcast_pacing_ms = 50
//! feedback_recent_limit = 10
//!
//! [logging]
//! level = "info"
//! file = "utilbot.log"
//! ```
//!
//! ## Environment Integration
//!
//! `UTILBOT_ADMINS` (comma separated numeric ids) replaces `bot.admins` when set.
//! Precedence: Environment > Config file > Defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::errors::BotError;
use crate::storage::UserId;

/// Environment variable overriding the administrator allow-list.
pub const ADMINS_ENV: &str = "UTILBOT_ADMINS";

/// Upper bound for the per-recipient broadcast pause.
pub const MAX_BROADCAST_PACING_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    /// Numeric ids allowed to run admin commands and broadcasts.
    #[serde(default)]
    pub admins: Vec<i64>,
    /// Ids placed on the fan-out blocklist at startup.
    #[serde(default)]
    pub blocked: Vec<i64>,
    /// Pause after each successful broadcast delivery (ms).
    #[serde(default = "default_broadcast_pacing_ms")]
    pub broadcast_pacing_ms: u64,
    /// Number of entries shown by `/admin_feedback`.
    #[serde(default = "default_feedback_recent_limit")]
    pub feedback_recent_limit: usize,
}

fn default_broadcast_pacing_ms() -> u64 {
    50
}

fn default_feedback_recent_limit() -> usize {
    10
}

impl BotConfig {
    pub fn is_admin(&self, id: UserId) -> bool {
        self.admins.contains(&id.0)
    }

    pub fn admin_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.admins.iter().copied().map(UserId)
    }

    pub fn broadcast_pacing(&self) -> Duration {
        Duration::from_millis(self.broadcast_pacing_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default)]
    pub security_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Replace the admin list from `UTILBOT_ADMINS` when that variable is set.
    pub fn apply_env_overrides(&mut self) -> Result<(), BotError> {
        if let Ok(raw) = std::env::var(ADMINS_ENV) {
            self.bot.admins = parse_id_list(&raw)?;
        }
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.bot.feedback_recent_limit == 0 {
            return Err(BotError::Config(
                "bot.feedback_recent_limit must be at least 1".into(),
            ));
        }
        if self.bot.broadcast_pacing_ms > MAX_BROADCAST_PACING_MS {
            return Err(BotError::Config(format!(
                "bot.broadcast_pacing_ms must be <= {}",
                MAX_BROADCAST_PACING_MS
            )));
        }
        Ok(())
    }
}

/// Parse a comma separated list of numeric ids; blank entries are skipped.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, BotError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| BotError::Config(format!("'{}' is not a numeric user id", s)))
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "Utility Bot".to_string(),
                admins: Vec::new(),
                blocked: Vec::new(),
                broadcast_pacing_ms: default_broadcast_pacing_ms(),
                feedback_recent_limit: default_feedback_recent_limit(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("utilbot.log".to_string()),
                security_file: Some("utilbot-security.log".to_string()),
            },
        }
    }
}
