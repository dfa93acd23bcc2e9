//! The framework: shared state tying the registry, dispatcher, prompt
//! routing, prefixes and settings together.
//!
//! A host creates one [`Framework`] per bot account, feeds it messages and
//! interactions, and otherwise leaves it alone.

use crate::config::{Config, DefaultsConfig};
use crate::dispatcher::{AwaitingReplies, DispatchOutcome, Dispatcher, Inhibitor, Matcher};
use crate::error::RegistrationError;
use crate::events::{EventBus, FrameworkEvent};
use crate::platform::ChatClient;
use crate::registry::{HandlerCatalog, Registry};
use crate::settings::{SettingProvider, SettingsError};
use commando_model::{GuildId, Interaction, Message, UserId};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Users that bypass every permission and throttle check.
#[derive(Debug, Default)]
pub struct Owners {
    ids: RwLock<HashSet<UserId>>,
}

impl Owners {
    pub fn new(ids: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            ids: RwLock::new(ids.into_iter().collect()),
        }
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.ids.read().contains(&id)
    }

    /// Returns false if `id` was already an owner.
    pub fn insert(&self, id: UserId) -> bool {
        self.ids.write().insert(id)
    }

    pub fn remove(&self, id: UserId) -> bool {
        self.ids.write().remove(&id)
    }

    /// Owner ids in ascending order.
    pub fn list(&self) -> Vec<UserId> {
        let mut ids: Vec<_> = self.ids.read().iter().copied().collect();
        ids.sort();
        ids
    }
}

/// Command prefixes: configured default, global override and per-guild
/// overrides. An empty string means "mentions only".
#[derive(Debug)]
struct Prefixes {
    default: String,
    global: RwLock<Option<String>>,
    guilds: DashMap<GuildId, String>,
}

impl Prefixes {
    fn global(&self) -> String {
        self.global.read().clone().unwrap_or_else(|| self.default.clone())
    }

    fn resolve(&self, guild: Option<GuildId>) -> String {
        guild
            .and_then(|g| self.guilds.get(&g).map(|p| p.clone()))
            .unwrap_or_else(|| self.global())
    }

    fn apply(&self, guild: Option<GuildId>, prefix: Option<String>) {
        match (guild, prefix) {
            (Some(g), Some(p)) => {
                self.guilds.insert(g, p);
            }
            (Some(g), None) => {
                self.guilds.remove(&g);
            }
            (None, prefix) => *self.global.write() = prefix,
        }
    }
}

/// Shared framework state.
pub struct Framework {
    client: Arc<dyn ChatClient>,
    registry: Registry,
    owners: Arc<Owners>,
    prefixes: Prefixes,
    awaiting: AwaitingReplies,
    dispatcher: Dispatcher,
    events: EventBus,
    provider: RwLock<Option<Arc<dyn SettingProvider>>>,
    invite: Option<String>,
    dm_prefixless: bool,
    defaults: DefaultsConfig,
    commands_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framework")
            .field("bot", &self.client.current_user().id)
            .field("prefixes", &self.prefixes)
            .field("owners", &self.owners)
            .field("has_provider", &self.provider.read().is_some())
            .finish_non_exhaustive()
    }
}

impl Framework {
    pub fn new(client: Arc<dyn ChatClient>, config: &Config) -> Arc<Self> {
        let events = EventBus::new();
        let owners = Arc::new(Owners::new(config.client.owners.iter().copied()));
        let registry = Registry::new(config.arguments.clone(), owners.clone(), events.clone());
        let matcher = Matcher::new(client.current_user().id);

        info!(
            bot = %client.current_user().id,
            prefix = %config.client.prefix,
            owners = owners.list().len(),
            "Framework created"
        );

        Arc::new(Self {
            client,
            registry,
            owners,
            prefixes: Prefixes {
                default: config.client.prefix.clone(),
                global: RwLock::new(None),
                guilds: DashMap::new(),
            },
            awaiting: AwaitingReplies::new(),
            dispatcher: Dispatcher::new(matcher),
            events,
            provider: RwLock::new(None),
            invite: config.client.invite.clone(),
            dm_prefixless: config.client.dm_prefixless,
            defaults: config.defaults.clone(),
            commands_dir: config.loader.commands_dir.clone(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn client(&self) -> &Arc<dyn ChatClient> {
        &self.client
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn owners(&self) -> &Arc<Owners> {
        &self.owners
    }

    pub fn is_owner(&self, id: UserId) -> bool {
        self.owners.contains(id)
    }

    pub fn awaiting(&self) -> &AwaitingReplies {
        &self.awaiting
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn invite(&self) -> Option<&str> {
        self.invite.as_deref()
    }

    pub fn dm_prefixless(&self) -> bool {
        self.dm_prefixless
    }

    // ========================================================================
    // Prefixes
    // ========================================================================

    /// Prefix in effect for `guild` (or globally). `None` means mentions only.
    pub fn prefix_for(&self, guild: Option<GuildId>) -> Option<String> {
        Some(self.prefixes.resolve(guild)).filter(|p| !p.is_empty())
    }

    /// The prefix configured at startup.
    pub fn default_prefix(&self) -> &str {
        &self.prefixes.default
    }

    /// Change a guild's prefix, or the global one when `guild` is `None`.
    ///
    /// `None` resets to the fallback; `Some("")` disables the prefix.
    pub fn set_prefix(&self, guild: Option<GuildId>, prefix: Option<String>) {
        debug!(guild = ?guild, prefix = ?prefix, "Prefix changed");
        self.prefixes.apply(guild, prefix.clone());
        self.events.emit(FrameworkEvent::CommandPrefixChange { guild, prefix });
    }

    /// Same as [`set_prefix`](Self::set_prefix) without emitting an event.
    pub(crate) fn apply_prefix(&self, guild: Option<GuildId>, prefix: Option<String>) {
        self.prefixes.apply(guild, prefix);
    }

    // ========================================================================
    // Registration helpers
    // ========================================================================

    /// Install the built-ins selected in the configuration.
    pub fn register_defaults(&self) -> Result<(), RegistrationError> {
        self.registry.register_defaults(&self.defaults)
    }

    /// Load manifests from the configured commands directory, if any.
    pub fn load_commands(&self, catalog: &HandlerCatalog) -> Result<usize, RegistrationError> {
        let Some(dir) = &self.commands_dir else {
            return Ok(0);
        };
        self.registry.register_commands_in(dir, catalog).map(|c| c.len())
    }

    pub fn add_inhibitor(&self, inhibitor: Arc<dyn Inhibitor>) -> bool {
        self.dispatcher.inhibitors().add(inhibitor)
    }

    pub fn remove_inhibitor(&self, inhibitor: &Arc<dyn Inhibitor>) -> bool {
        self.dispatcher.inhibitors().remove(inhibitor)
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Attach a settings provider, replacing (and destroying) any previous one.
    pub async fn set_provider(self: &Arc<Self>, provider: Arc<dyn SettingProvider>) -> Result<(), SettingsError> {
        let previous = self.provider.write().take();
        if let Some(previous) = previous {
            previous.destroy().await?;
        }
        provider.init(self).await?;
        *self.provider.write() = Some(provider);
        self.events.emit(FrameworkEvent::ProviderReady);
        info!("Settings provider ready");
        Ok(())
    }

    pub fn settings(&self) -> Option<Arc<dyn SettingProvider>> {
        self.provider.read().clone()
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    pub async fn handle_message(self: &Arc<Self>, message: Message) -> DispatchOutcome {
        self.dispatcher.handle_message(self, message).await
    }

    pub async fn handle_interaction(self: &Arc<Self>, interaction: Interaction) -> DispatchOutcome {
        self.dispatcher.handle_interaction(self, interaction).await
    }

    /// Detach the settings provider and drop throttle state.
    pub async fn shutdown(&self) {
        let provider = self.provider.write().take();
        if let Some(provider) = provider
            && let Err(e) = provider.destroy().await
        {
            warn!(error = %e, "Failed to shut down settings provider");
        }
        for command in self.registry.commands() {
            command.clear_throttles();
        }
        info!("Framework shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owners() {
        let owners = Owners::new([UserId(2), UserId(1)]);
        assert!(owners.contains(UserId(1)));
        assert!(!owners.insert(UserId(2)));
        assert!(owners.insert(UserId(3)));
        assert!(owners.remove(UserId(1)));
        assert_eq!(owners.list(), vec![UserId(2), UserId(3)]);
    }

    #[test]
    fn test_prefix_resolution() {
        let prefixes = Prefixes {
            default: "!".into(),
            global: RwLock::new(None),
            guilds: DashMap::new(),
        };
        let g = GuildId(1);
        assert_eq!(prefixes.resolve(Some(g)), "!");

        prefixes.apply(None, Some("?".into()));
        assert_eq!(prefixes.resolve(Some(g)), "?");

        prefixes.apply(Some(g), Some(String::new()));
        assert_eq!(prefixes.resolve(Some(g)), "");
        assert_eq!(prefixes.resolve(None), "?");

        prefixes.apply(Some(g), None);
        prefixes.apply(None, None);
        assert_eq!(prefixes.resolve(Some(g)), "!");
    }
}
