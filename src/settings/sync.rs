//! Cross-process propagation of global settings.
//!
//! Each process persists its own writes; siblings only need to refresh
//! their caches. Changes travel as plain data, never as code.

use super::{Scope, SettingsError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// One setting written by some process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingChange {
    /// Identifies the writing provider so it can skip its own changes.
    pub origin: u64,
    pub scope: Scope,
    pub key: String,
    /// `None` when the key was removed.
    pub value: Option<Value>,
}

/// Transport for [`SettingChange`]s between sibling processes.
pub trait SettingBroadcaster: Send + Sync {
    fn publish(&self, change: SettingChange) -> Result<(), SettingsError>;

    fn subscribe(&self) -> broadcast::Receiver<SettingChange>;
}

/// In-process broadcaster. Clones share one channel, so providers built
/// from clones behave like sibling shards.
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<SettingChange>,
}

impl ChannelBroadcaster {
    pub const CAPACITY: usize = 128;

    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(Self::CAPACITY);
        Self { tx }
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingBroadcaster for ChannelBroadcaster {
    fn publish(&self, change: SettingChange) -> Result<(), SettingsError> {
        // No receivers just means no siblings are listening.
        let _ = self.tx.send(change);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.tx.subscribe()
    }
}
