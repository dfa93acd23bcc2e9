//! Persistent per-guild and global settings.
//!
//! A [`SettingProvider`] serves synchronous reads from memory and persists
//! writes asynchronously. [`SqliteProvider`] is the bundled implementation;
//! [`sync`] carries global-scope changes between sibling processes.

mod sqlite;
pub mod sync;

pub use sqlite::SqliteProvider;
pub use sync::{ChannelBroadcaster, SettingBroadcaster, SettingChange};

use crate::framework::Framework;
use async_trait::async_trait;
use commando_model::GuildId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Settings key for a guild's command prefix.
pub const PREFIX_KEY: &str = "prefix";

/// Settings key for a command's enabled flag.
pub fn command_key(name: &str) -> String {
    format!("cmd-{}", name)
}

/// Settings key for a group's enabled flag.
pub fn group_key(id: &str) -> String {
    format!("grp-{}", id)
}

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to broadcast setting change: {0}")]
    Broadcast(String),
    #[error("invalid scope: {0:?}")]
    InvalidScope(String),
}

/// Which settings object a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Scope {
    Global,
    Guild(GuildId),
}

impl Scope {
    pub fn guild(guild: Option<GuildId>) -> Self {
        guild.map_or(Self::Global, Self::Guild)
    }

    pub fn guild_id(self) -> Option<GuildId> {
        match self {
            Self::Global => None,
            Self::Guild(id) => Some(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Scope {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(Self::Global);
        }
        s.parse()
            .map(Self::Guild)
            .map_err(|_| SettingsError::InvalidScope(s.to_string()))
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}

impl TryFrom<String> for Scope {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GuildId> for Scope {
    fn from(id: GuildId) -> Self {
        Self::Guild(id)
    }
}

/// Storage for settings keyed by scope.
#[async_trait]
pub trait SettingProvider: Send + Sync {
    /// Load stored state and start listening to the framework.
    async fn init(&self, framework: &Arc<Framework>) -> Result<(), SettingsError>;

    /// Stop listening. Stored data is kept.
    async fn destroy(&self) -> Result<(), SettingsError>;

    /// Cached value of `key`, or `default`.
    fn get(&self, scope: Scope, key: &str, default: Value) -> Value;

    /// Store `value` and return it.
    async fn set(&self, scope: Scope, key: &str, value: Value) -> Result<Value, SettingsError>;

    /// Remove `key`, returning its previous value.
    async fn remove(&self, scope: Scope, key: &str) -> Result<Option<Value>, SettingsError>;

    /// Remove every key in `scope`.
    async fn clear(&self, scope: Scope) -> Result<(), SettingsError>;
}
