//! Command groups.

use super::Command;
use crate::error::StateError;
use crate::events::{EventBus, FrameworkEvent};
use commando_model::GuildId;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Declarative group definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub guarded: bool,
}

impl GroupInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            guarded: false,
        }
    }

    pub fn guarded(mut self) -> Self {
        self.guarded = true;
        self
    }
}

impl<I: Into<String>, N: Into<String>> From<(I, N)> for GroupInfo {
    fn from((id, name): (I, N)) -> Self {
        Self::new(id, name)
    }
}

/// A named collection of commands that can be toggled together.
pub struct Group {
    pub id: String,
    pub name: String,
    /// Guarded groups cannot be disabled.
    pub guarded: bool,
    commands: RwLock<Vec<Weak<Command>>>,
    global_enabled: AtomicBool,
    guild_enabled: DashMap<GuildId, bool>,
    events: EventBus,
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.id)
            .field("guarded", &self.guarded)
            .field("commands", &self.commands.read().len())
            .finish()
    }
}

impl Group {
    pub(crate) fn new(info: GroupInfo, events: EventBus) -> Self {
        Self {
            id: info.id,
            name: info.name,
            guarded: info.guarded,
            commands: RwLock::new(Vec::new()),
            global_enabled: AtomicBool::new(true),
            guild_enabled: DashMap::new(),
            events,
        }
    }

    /// Member commands in registration order.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.read().iter().filter_map(Weak::upgrade).collect()
    }

    pub(crate) fn push(&self, command: &Arc<Command>) {
        self.commands.write().push(Arc::downgrade(command));
    }

    pub(crate) fn remove(&self, command: &Arc<Command>) {
        let target = Arc::as_ptr(command);
        self.commands
            .write()
            .retain(|c| c.strong_count() > 0 && !std::ptr::eq(c.as_ptr(), target));
    }

    pub(crate) fn replace(&self, old: &Arc<Command>, new: &Arc<Command>) {
        let target = Arc::as_ptr(old);
        let mut commands = self.commands.write();
        match commands.iter().position(|c| std::ptr::eq(c.as_ptr(), target)) {
            Some(i) => commands[i] = Arc::downgrade(new),
            None => commands.push(Arc::downgrade(new)),
        }
    }

    /// Whether the group is enabled in `guild`, or globally for `None`.
    pub fn is_enabled_in(&self, guild: Option<GuildId>) -> bool {
        if self.guarded {
            return true;
        }
        match guild {
            Some(id) => self
                .guild_enabled
                .get(&id)
                .map_or_else(|| self.global_enabled.load(Ordering::Acquire), |v| *v),
            None => self.global_enabled.load(Ordering::Acquire),
        }
    }

    /// Enable or disable the group and announce the change.
    pub fn set_enabled_in(&self, guild: Option<GuildId>, enabled: bool) -> Result<(), StateError> {
        if self.guarded {
            return Err(StateError::GuardedGroup(self.id.clone()));
        }
        self.apply_enabled_in(guild, enabled);
        self.events.emit(FrameworkEvent::GroupStatusChange {
            guild,
            group: self.id.clone(),
            enabled,
        });
        Ok(())
    }

    /// Set the flag without emitting an event. Used when restoring state.
    pub(crate) fn apply_enabled_in(&self, guild: Option<GuildId>, enabled: bool) {
        if self.guarded {
            return;
        }
        debug!(group = %self.id, guild = ?guild, enabled, "group state changed");
        match guild {
            Some(id) => {
                self.guild_enabled.insert(id, enabled);
            }
            None => self.global_enabled.store(enabled, Ordering::Release),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guild_flag_falls_back_to_global() {
        let group = Group::new(GroupInfo::new("util", "Utility"), EventBus::new());
        let guild = GuildId(7);
        assert!(group.is_enabled_in(Some(guild)));

        group.set_enabled_in(None, false).unwrap();
        assert!(!group.is_enabled_in(Some(guild)));

        group.set_enabled_in(Some(guild), true).unwrap();
        assert!(group.is_enabled_in(Some(guild)));
        assert!(!group.is_enabled_in(None));
    }

    #[test]
    fn test_guarded_group_refuses_disable() {
        let group = Group::new(GroupInfo::new("commands", "Commands").guarded(), EventBus::new());
        assert_eq!(
            group.set_enabled_in(None, false),
            Err(StateError::GuardedGroup("commands".into()))
        );
        assert!(group.is_enabled_in(None));
    }

    #[tokio::test]
    async fn test_status_change_is_announced() {
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let group = Group::new(GroupInfo::new("fun", "Fun"), events);
        group.set_enabled_in(Some(GuildId(1)), false).unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            FrameworkEvent::GroupStatusChange {
                guild: Some(GuildId(1)),
                group: "fun".into(),
                enabled: false,
            }
        );
    }
}
