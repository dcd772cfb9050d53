//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub plugins: PluginConfig,
    pub reconciliation: ReconciliationConfig,
    pub leveling: LevelingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ReconciliationConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LevelingConfig {
    pub points_per_message: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "mainframe-bot".to_string(),
            prefix: "!".to_string(),
            token: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mainframe.db"),
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("plugins"),
        }
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self { interval_seconds: 15 }
    }
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self { points_per_message: 1.0 }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.reconciliation.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "reconciliation.interval-seconds must be at least 1".to_string(),
            ));
        }
        if !self.leveling.points_per_message.is_finite() || self.leveling.points_per_message < 0.0 {
            return Err(ConfigError::InvalidValue(
                "leveling.points-per-message must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconciliation.interval_seconds)
    }

    /// Apply environment variable overrides on top of `self`
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            self.bot.token = Some(token);
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Ok(path) = std::env::var("BOT_DATABASE") {
            self.database.path = PathBuf::from(path);
        }

        if let Ok(dir) = std::env::var("BOT_PLUGINS_DIR") {
            self.plugins.directory = PathBuf::from(dir);
        }

        self
    }

    pub fn load_env() -> Self {
        Config::default().with_env()
    }
}
