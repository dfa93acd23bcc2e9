//! Registered commands and the handler trait.

use super::argument::ArgumentInfo;
use super::collector::{ArgumentCollector, ArgumentValues};
use super::guard::{self, BlockReason, PermissionCheck};
use super::info::{self, ArgsType, CommandInfo};
use super::throttle::{ThrottleState, ThrottleTable, Throttling};
use super::{CommandContext, Group};
use crate::error::{CommandError, CommandResult, StateError, ValidationError};
use crate::events::{EventBus, FrameworkEvent};
use crate::framework::Owners;
use crate::registry::Registry;
use async_trait::async_trait;
use commando_model::{GuildId, Permission, User, UserId};
use dashmap::DashMap;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

// ============================================================================
// Handler trait
// ============================================================================

/// The behaviour behind a command.
///
/// Only `run` is required. The hooks default to the stock replies.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command with its collected arguments.
    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult;

    /// Run the command from a structured interaction.
    async fn run_interaction(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        self.run(ctx, args).await
    }

    /// Extra permission logic, consulted after the declarative checks pass.
    async fn has_permission(&self, _ctx: &CommandContext) -> PermissionCheck {
        PermissionCheck::Granted
    }

    /// Reply for a blocked invocation. `None` blocks silently.
    fn on_block(&self, command: &Command, reason: &BlockReason) -> Option<String> {
        reason.message(&command.name)
    }

    /// Reply for a failed invocation. `None` sends nothing.
    fn on_error(&self, ctx: &CommandContext, _error: &CommandError) -> Option<String> {
        Some(guard::error_reply(ctx.framework().invite()))
    }
}

// ============================================================================
// Command
// ============================================================================

/// A validated, registrable command.
pub struct Command {
    pub name: String,
    pub aliases: Vec<String>,
    pub group_id: String,
    pub member_name: String,
    pub description: String,
    pub format: Option<String>,
    pub details: Option<String>,
    pub examples: Vec<String>,
    pub guild_only: bool,
    pub owner_only: bool,
    pub nsfw: bool,
    pub client_permissions: Vec<Permission>,
    pub user_permissions: Vec<Permission>,
    pub throttling: Option<Throttling>,
    pub args_type: ArgsType,
    pub args_count: Option<usize>,
    pub args_single_quotes: bool,
    pub patterns: Vec<Regex>,
    pub default_handling: bool,
    pub guarded: bool,
    pub hidden: bool,
    pub unknown: bool,
    collector: Option<ArgumentCollector>,
    handler: Arc<dyn CommandHandler>,
    group: OnceLock<Arc<Group>>,
    global_enabled: AtomicBool,
    guild_enabled: DashMap<GuildId, bool>,
    throttles: Option<ThrottleTable>,
    owners: Arc<Owners>,
    events: EventBus,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("group", &self.group_id)
            .field("aliases", &self.aliases)
            .field("guarded", &self.guarded)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Validate `info` and build the command.
    ///
    /// Argument types are resolved against `registry`, so they must be
    /// registered first.
    pub fn new(
        registry: &Registry,
        info: CommandInfo,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Self, ValidationError> {
        info::validate_identity(&info)?;
        let client_permissions = info::parse_permissions(&info.client_permissions)?;
        let user_permissions = info::parse_permissions(&info.user_permissions)?;
        let patterns = info::compile_patterns(&info.patterns)?;

        let settings = registry.arguments();
        let collector = if info.args.is_empty() {
            None
        } else {
            Some(ArgumentCollector::new(
                registry,
                info.args.clone(),
                info.args_prompt_limit.or(settings.prompt_limit),
                settings.wait_secs,
            )?)
        };
        let format = info.format.clone().or_else(|| derive_format(&info.args));

        Ok(Self {
            member_name: info.member_name.unwrap_or_else(|| info.name.clone()),
            name: info.name,
            aliases: info.aliases,
            group_id: info.group,
            description: info.description,
            format,
            details: info.details,
            examples: info.examples,
            guild_only: info.guild_only,
            owner_only: info.owner_only,
            nsfw: info.nsfw,
            client_permissions,
            user_permissions,
            throttling: info.throttling,
            args_type: info.args_type,
            args_count: info.args_count,
            args_single_quotes: info.args_single_quotes.unwrap_or(settings.single_quotes),
            patterns,
            default_handling: info.default_handling,
            guarded: info.guarded,
            hidden: info.hidden,
            unknown: info.unknown,
            collector,
            handler,
            group: OnceLock::new(),
            global_enabled: AtomicBool::new(true),
            guild_enabled: DashMap::new(),
            throttles: info.throttling.map(ThrottleTable::new),
            owners: registry.owners().clone(),
            events: registry.events().clone(),
        })
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    pub fn collector(&self) -> Option<&ArgumentCollector> {
        self.collector.as_ref()
    }

    /// The owning group, once registered.
    pub fn group(&self) -> Option<&Arc<Group>> {
        self.group.get()
    }

    pub(crate) fn attach_group(&self, group: Arc<Group>) {
        if self.group.set(group).is_err() {
            warn!(command = %self.name, "command already belongs to a group");
        }
    }

    /// Whether `name` is this command's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    // ------------------------------------------------------------------------
    // Guard chain
    // ------------------------------------------------------------------------

    /// Check whether the invoking user may run the command.
    ///
    /// Owners bypass every check. Otherwise `owner_only`, then the declared
    /// user permissions (guild channels only), then the handler's own check.
    pub async fn has_permission(&self, ctx: &CommandContext) -> PermissionCheck {
        let author = ctx.author();
        if self.owners.contains(author.id) {
            return PermissionCheck::Granted;
        }
        if self.owner_only {
            return PermissionCheck::OwnerOnly;
        }
        if !self.user_permissions.is_empty()
            && let Some(guild) = ctx.guild()
        {
            match ctx
                .framework()
                .client()
                .permissions_in(guild, ctx.channel(), author.id)
                .await
            {
                Ok(perms) => {
                    let missing = perms.missing(&self.user_permissions);
                    if !missing.is_empty() {
                        return PermissionCheck::Missing(missing);
                    }
                }
                Err(e) => {
                    debug!(command = %self.name, error = %e, "permission lookup failed");
                    return PermissionCheck::Missing(self.user_permissions.clone());
                }
            }
        }
        self.handler.has_permission(ctx).await
    }

    /// Whether the command is enabled in `guild` (or globally for `None`).
    ///
    /// Guarded commands are always enabled. Otherwise the owning group must
    /// be enabled too, unless `bypass_group` is set.
    pub fn is_enabled_in(&self, guild: Option<GuildId>, bypass_group: bool) -> bool {
        if self.guarded {
            return true;
        }
        if !bypass_group && self.group().is_some_and(|g| !g.is_enabled_in(guild)) {
            return false;
        }
        match guild {
            Some(id) => self
                .guild_enabled
                .get(&id)
                .map_or_else(|| self.global_enabled.load(Ordering::Acquire), |v| *v),
            None => self.global_enabled.load(Ordering::Acquire),
        }
    }

    /// Enable or disable the command and announce the change.
    pub fn set_enabled_in(&self, guild: Option<GuildId>, enabled: bool) -> Result<(), StateError> {
        if self.guarded {
            return Err(StateError::GuardedCommand(self.name.clone()));
        }
        self.apply_enabled_in(guild, enabled);
        self.events.emit(FrameworkEvent::CommandStatusChange {
            guild,
            command: self.name.clone(),
            enabled,
        });
        Ok(())
    }

    /// Set the flag without emitting an event. Used when restoring state.
    pub(crate) fn apply_enabled_in(&self, guild: Option<GuildId>, enabled: bool) {
        if self.guarded {
            return;
        }
        match guild {
            Some(id) => {
                self.guild_enabled.insert(id, enabled);
            }
            None => self.global_enabled.store(enabled, Ordering::Release),
        }
    }

    /// Whether the command could run for this context right now.
    pub async fn is_usable(&self, ctx: &CommandContext) -> bool {
        if self.guild_only && ctx.guild().is_none() {
            return false;
        }
        self.is_enabled_in(ctx.guild_id(), false) && self.has_permission(ctx).await.is_granted()
    }

    // ------------------------------------------------------------------------
    // Throttling
    // ------------------------------------------------------------------------

    /// The user's throttle window, or `None` if the command is not
    /// throttled or the user is an owner.
    pub fn throttle(&self, user: UserId) -> Option<ThrottleState> {
        let table = self.throttles.as_ref()?;
        if self.owners.contains(user) {
            return None;
        }
        Some(table.window(user))
    }

    /// How long `user` must wait, if the next use would exceed the limit.
    pub fn throttle_remaining(&self, user: UserId) -> Option<std::time::Duration> {
        let state = self.throttle(user)?;
        let policy = self.throttling?;
        (state.usages + 1 > policy.usages).then(|| state.remaining())
    }

    /// Count one use against the user's window.
    pub fn record_usage(&self, user: UserId) {
        if let Some(table) = &self.throttles
            && !self.owners.contains(user)
        {
            table.record(user);
        }
    }

    /// Drop every throttle record and cancel its timer.
    pub fn clear_throttles(&self) {
        if let Some(table) = &self.throttles {
            table.clear();
        }
    }

    // ------------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------------

    /// Render how to invoke this command with `arg_string`.
    pub fn usage(&self, arg_string: Option<&str>, prefix: Option<&str>, user: Option<&User>) -> String {
        let text = match arg_string.or(self.format.as_deref()) {
            Some(args) if !args.is_empty() => format!("{} {}", self.name, args),
            _ => self.name.clone(),
        };
        guard::usage(&text, prefix, user)
    }

    /// Reply text for a block, deferring to the handler.
    pub fn block_message(&self, reason: &BlockReason) -> Option<String> {
        self.handler.on_block(self, reason)
    }
}

/// `<required> [optional] <many...>` from the argument schema.
fn derive_format(args: &[ArgumentInfo]) -> Option<String> {
    if args.is_empty() {
        return None;
    }
    let parts: Vec<String> = args
        .iter()
        .map(|a| {
            let label = a.label.as_deref().unwrap_or(&a.key);
            let dots = if a.infinite { "..." } else { "" };
            if a.default.is_some() || a.default_value.is_some() {
                format!("[{}{}]", label, dots)
            } else {
                format!("<{}{}>", label, dots)
            }
        })
        .collect();
    Some(parts.join(" "))
}

// ============================================================================
// Registration sources
// ============================================================================

/// Deferred construction of a command against a registry.
pub trait CommandFactory: Send {
    fn build(self: Box<Self>, registry: &Registry) -> Result<Command, ValidationError>;
}

impl<F> CommandFactory for F
where
    F: FnOnce(&Registry) -> Result<Command, ValidationError> + Send,
{
    fn build(self: Box<Self>, registry: &Registry) -> Result<Command, ValidationError> {
        (*self)(registry)
    }
}

/// What a registry accepts as a command: a ready instance or a factory.
pub enum CommandSource {
    Instance(Command),
    Factory(Box<dyn CommandFactory>),
}

impl CommandSource {
    /// Build from a descriptor and handler at registration time.
    pub fn new(info: CommandInfo, handler: impl CommandHandler + 'static) -> Self {
        Self::from_parts(info, Arc::new(handler))
    }

    pub fn from_parts(info: CommandInfo, handler: Arc<dyn CommandHandler>) -> Self {
        Self::Factory(Box::new(move |registry: &Registry| {
            Command::new(registry, info, handler)
        }))
    }

    pub(crate) fn build(self, registry: &Registry) -> Result<Command, ValidationError> {
        match self {
            Self::Instance(command) => Ok(command),
            Self::Factory(factory) => factory.build(registry),
        }
    }
}

impl From<Command> for CommandSource {
    fn from(command: Command) -> Self {
        Self::Instance(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_format() {
        let args = vec![
            ArgumentInfo::new("user", "user", "Who?"),
            ArgumentInfo::new("reason", "string", "Why?")
                .default_value("")
                .infinite(),
        ];
        assert_eq!(derive_format(&args).as_deref(), Some("<user> [reason...]"));
        assert_eq!(derive_format(&[]), None);
    }
}
