//! Core configuration types and loading.

use super::defaults::{default_prefix, default_settings_path, default_true, default_wait_secs};
use commando_model::UserId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Framework configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Client-wide options.
    #[serde(default)]
    pub client: ClientConfig,
    /// Defaults for argument collection.
    #[serde(default)]
    pub arguments: ArgumentsConfig,
    /// Which built-ins `register_defaults` installs.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Settings persistence (optional; no provider when absent).
    #[serde(default)]
    pub settings: Option<SettingsConfig>,
    /// Directory loader.
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Client-wide options.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Default command prefix. Empty means mention-only.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Users recognised as bot owners.
    #[serde(default)]
    pub owners: Vec<UserId>,
    /// Support-server invite shown in error replies.
    #[serde(default)]
    pub invite: Option<String>,
    /// Whether direct messages may omit the prefix.
    #[serde(default = "default_true")]
    pub dm_prefixless: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            owners: Vec::new(),
            invite: None,
            dm_prefixless: true,
        }
    }
}

/// Defaults applied to every argument collector.
#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentsConfig {
    /// Maximum re-prompts per argument (unlimited when absent).
    #[serde(default)]
    pub prompt_limit: Option<u32>,
    /// Seconds to wait for each prompt answer.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
    /// Whether single quotes group words by default.
    #[serde(default = "default_true")]
    pub single_quotes: bool,
}

impl Default for ArgumentsConfig {
    fn default() -> Self {
        Self {
            prompt_limit: None,
            wait_secs: default_wait_secs(),
            single_quotes: true,
        }
    }
}

/// Named toggles for the built-in groups, types and commands.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_true")]
    pub groups: bool,
    #[serde(default = "default_true")]
    pub types: bool,
    #[serde(default = "default_true")]
    pub help: bool,
    #[serde(default = "default_true")]
    pub prefix: bool,
    #[serde(default = "default_true")]
    pub ping: bool,
    /// `enable`, `disable` and `groups`.
    #[serde(default = "default_true")]
    pub command_state: bool,
    #[serde(default = "default_true")]
    pub unknown_command: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            groups: true,
            types: true,
            help: true,
            prefix: true,
            ping: true,
            command_state: true,
            unknown_command: true,
        }
    }
}

impl DefaultsConfig {
    /// Everything off; useful when a host only wants the argument types.
    pub fn none() -> Self {
        Self {
            groups: false,
            types: false,
            help: false,
            prefix: false,
            ping: false,
            command_state: false,
            unknown_command: false,
        }
    }
}

/// Settings persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_settings_path")]
    pub path: String,
}

/// Directory loader.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderConfig {
    /// Root holding `<group>/<command>.toml` manifests.
    #[serde(default)]
    pub commands_dir: Option<PathBuf>,
}
