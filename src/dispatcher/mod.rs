//! Message and interaction dispatch.
//!
//! A message goes through:
//! 1. bot/self filtering and prompt-answer routing
//! 2. the global user blacklist
//! 3. pattern commands, then prefix/mention/DM token matching
//! 4. inhibitors and the enabled check
//! 5. the guard chain (guild-only, NSFW, permissions, client
//!    permissions, throttling)
//! 6. argument collection
//! 7. the handler, inside a `commando.command` span
//!
//! Every failure after step 3 is answered in the channel; nothing
//! propagates to the host.

mod awaiting;
mod inhibitor;
mod matcher;

pub use awaiting::{AwaitingGuard, AwaitingReplies};
pub use inhibitor::{Inhibition, Inhibitor, Inhibitors};
pub use matcher::{Matched, Matcher};

use crate::commands::{
    ArgumentValues, BlockReason, CollectMode, CollectionFailure, Command, CommandContext,
    EntryMode, FailureReason, Source, guard, parse_args, strip_quotes,
};
use crate::error::CommandError;
use crate::events::FrameworkEvent;
use crate::framework::Framework;
use crate::settings::Scope;
use crate::types::ArgValue;
use commando_model::{Interaction, Message};
use futures_util::FutureExt;
use serde_json::{Value, json};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};

/// Global setting listing user ids whose messages are ignored.
pub const USER_BLACKLIST_KEY: &str = "userBlacklist";

/// What happened to an inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Not addressed to the bot, or from an ignored source.
    Ignored,
    /// Consumed as an answer to an argument prompt.
    PromptAnswer,
    /// Addressed to the bot but no runnable command matched.
    Unknown,
    /// An inhibitor stopped the command.
    Inhibited(String),
    /// The command is disabled here.
    Disabled,
    /// A guard stopped the command.
    Blocked(BlockReason),
    /// Arguments could not be collected.
    InvalidArguments,
    /// The user cancelled or let a prompt time out.
    Cancelled,
    /// The handler ran to completion.
    Completed,
    /// The handler failed.
    Failed,
}

/// Routes inbound events to commands.
#[derive(Debug)]
pub struct Dispatcher {
    matcher: Matcher,
    inhibitors: Inhibitors,
}

impl Dispatcher {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            matcher,
            inhibitors: Inhibitors::default(),
        }
    }

    pub fn inhibitors(&self) -> &Inhibitors {
        &self.inhibitors
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    // ========================================================================
    // Messages
    // ========================================================================

    pub async fn handle_message(&self, framework: &Arc<Framework>, message: Message) -> DispatchOutcome {
        let bot = framework.client().current_user().id;
        if message.author.bot || message.webhook || message.author.id == bot {
            return DispatchOutcome::Ignored;
        }
        if framework.awaiting().deliver(&message) {
            return DispatchOutcome::PromptAnswer;
        }
        if is_blacklisted(framework, &message) {
            debug!(user = %message.author.id, "ignoring blacklisted user");
            return DispatchOutcome::Ignored;
        }

        if let Some((command, matches)) = match_pattern(framework, &message.content) {
            let ctx = CommandContext::new(framework.clone(), Source::Message(message), EntryMode::Pattern)
                .with_command(Some(command.clone()), None)
                .with_pattern_matches(matches);
            return self.invoke(ctx, command).await;
        }

        let guild = message.guild_id();
        let prefix = framework.prefix_for(guild);
        let matched = match self.matcher.matches(&message.content, prefix.as_deref()) {
            Some(m) => m,
            None if framework.dm_prefixless() && !message.channel.is_guild() => {
                match self.matcher.matches_prefixless(&message.content) {
                    Some(m) => m,
                    None => return DispatchOutcome::Ignored,
                }
            }
            None => return DispatchOutcome::Ignored,
        };

        let prefix_used = (matched.mode == EntryMode::Prefix).then(|| prefix.clone()).flatten();
        let found = framework.registry().find_commands(&matched.token, true);
        let command = match found.as_slice() {
            [one] if one.default_handling => Some(one.clone()),
            _ => None,
        };

        let Some(command) = command else {
            return self.unknown(framework, message, matched, prefix_used).await;
        };

        let ctx = CommandContext::new(framework.clone(), Source::Message(message), matched.mode)
            .with_command(Some(command.clone()), Some(matched.token))
            .with_arg_string(matched.arg_string)
            .with_prefix(prefix_used);
        self.invoke(ctx, command).await
    }

    async fn unknown(
        &self,
        framework: &Arc<Framework>,
        message: Message,
        matched: Matched,
        prefix_used: Option<String>,
    ) -> DispatchOutcome {
        if matched.mode == EntryMode::DirectMessage {
            return DispatchOutcome::Ignored;
        }
        let fallback = framework.registry().unknown_command();
        let runnable = fallback
            .as_ref()
            .filter(|c| c.is_enabled_in(message.guild_id(), false));
        let Some(fallback) = runnable.cloned() else {
            debug!(token = %matched.token, "unknown command");
            framework.events().emit(FrameworkEvent::UnknownCommand {
                user: message.author.id,
                channel: message.channel.id,
                content: message.content.clone(),
            });
            return DispatchOutcome::Unknown;
        };

        let ctx = CommandContext::new(framework.clone(), Source::Message(message), matched.mode)
            .with_command(Some(fallback.clone()), Some(matched.token))
            .with_arg_string(matched.arg_string)
            .with_prefix(prefix_used);
        match self.invoke(ctx, fallback).await {
            DispatchOutcome::Completed => DispatchOutcome::Unknown,
            other => other,
        }
    }

    // ========================================================================
    // Interactions
    // ========================================================================

    pub async fn handle_interaction(
        &self,
        framework: &Arc<Framework>,
        interaction: Interaction,
    ) -> DispatchOutcome {
        if !interaction.is_command() || interaction.user.bot {
            return DispatchOutcome::Ignored;
        }
        let Some(command) = framework.registry().resolve_command(&interaction.command_name) else {
            debug!(command = %interaction.command_name, "unknown interaction command");
            framework.events().emit(FrameworkEvent::UnknownCommand {
                user: interaction.user.id,
                channel: interaction.channel.id,
                content: interaction.command_name.clone(),
            });
            return DispatchOutcome::Unknown;
        };
        let name = interaction.command_name.to_lowercase();
        let ctx = CommandContext::for_interaction(framework.clone(), interaction)
            .with_command(Some(command.clone()), Some(name));
        self.invoke(ctx, command).await
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    async fn invoke(&self, ctx: CommandContext, command: Arc<Command>) -> DispatchOutcome {
        let framework = ctx.framework().clone();
        let events = framework.events();
        let user = ctx.author().id;

        if let Some(inhibition) = self.inhibitors.check(&ctx).await {
            debug!(command = %command.name, reason = %inhibition.reason, "command inhibited");
            events.emit(FrameworkEvent::CommandBlock {
                command: command.name.clone(),
                user,
                reason: inhibition.reason.clone(),
            });
            if let Some(response) = &inhibition.response {
                send_reply(&ctx, response).await;
            }
            return DispatchOutcome::Inhibited(inhibition.reason);
        }

        if !command.is_enabled_in(ctx.guild_id(), false) {
            if command.unknown {
                events.emit(FrameworkEvent::UnknownCommand {
                    user,
                    channel: ctx.channel().id,
                    content: ctx.message().map(|m| m.content.clone()).unwrap_or_default(),
                });
                return DispatchOutcome::Unknown;
            }
            send_reply(&ctx, &format!("The `{}` command is disabled.", command.name)).await;
            return DispatchOutcome::Disabled;
        }

        if let Some(reason) = guard_chain(&ctx, &command).await {
            events.emit(FrameworkEvent::CommandBlock {
                command: command.name.clone(),
                user,
                reason: reason.code().to_string(),
            });
            match command.block_message(&reason) {
                Some(text) => send_reply(&ctx, &text).await,
                None => debug!(command = %command.name, reason = %reason.code(), "silent block"),
            }
            return DispatchOutcome::Blocked(reason);
        }

        let args = match collect_args(&ctx, &command).await {
            Ok(args) => args,
            Err(failure) => return report_failure(&ctx, &command, failure).await,
        };

        command.record_usage(user);
        events.emit(FrameworkEvent::CommandRun {
            command: command.name.clone(),
            user,
            guild: ctx.guild_id(),
        });

        let span = info_span!(
            "commando.command",
            command = %command.name,
            user = %user,
            guild = ?ctx.guild_id(),
            channel = %ctx.channel().id,
            mode = ?ctx.mode(),
        );
        let handler = command.handler().clone();
        let run = async {
            if ctx.mode() == EntryMode::Interaction {
                handler.run_interaction(&ctx, args).await
            } else {
                handler.run(&ctx, args).await
            }
        };
        let result = match AssertUnwindSafe(run).catch_unwind().instrument(span).await {
            Ok(result) => result,
            Err(_) => Err(CommandError::Panicked),
        };

        match result {
            Ok(()) => DispatchOutcome::Completed,
            Err(err) => {
                events.emit(FrameworkEvent::CommandError {
                    command: command.name.clone(),
                    user,
                    error: err.to_string(),
                });
                match &err {
                    CommandError::Friendly(text) => send_reply(&ctx, text).await,
                    other => {
                        error!(
                            command = %command.name,
                            code = other.error_code(),
                            error = %other,
                            "command failed"
                        );
                        if let Some(text) = command.handler().on_error(&ctx, other) {
                            send_reply(&ctx, &text).await;
                        }
                    }
                }
                DispatchOutcome::Failed
            }
        }
    }
}

// ============================================================================
// Pipeline steps
// ============================================================================

fn is_blacklisted(framework: &Framework, message: &Message) -> bool {
    let Some(settings) = framework.settings() else {
        return false;
    };
    let id = message.author.id.to_string();
    match settings.get(Scope::Global, USER_BLACKLIST_KEY, json!([])) {
        Value::Array(ids) => ids.iter().any(|v| match v {
            Value::String(s) => *s == id,
            Value::Number(n) => n.as_u64() == Some(message.author.id.get()),
            _ => false,
        }),
        _ => false,
    }
}

fn match_pattern(framework: &Framework, content: &str) -> Option<(Arc<Command>, Vec<Option<String>>)> {
    framework.registry().commands().into_iter().find_map(|command| {
        let matches = command.patterns.iter().find_map(|re| {
            re.captures(content).map(|caps| {
                caps.iter()
                    .map(|m| m.map(|m| m.as_str().to_string()))
                    .collect::<Vec<_>>()
            })
        })?;
        Some((command, matches))
    })
}

/// Run the guard chain. `None` means the command may run.
pub async fn guard_chain(ctx: &CommandContext, command: &Command) -> Option<BlockReason> {
    if command.guild_only && ctx.guild().is_none() {
        return Some(BlockReason::GuildOnly);
    }
    if command.nsfw && !ctx.channel().nsfw {
        return Some(BlockReason::Nsfw);
    }
    if let Some(block) = command.has_permission(ctx).await.into_block(&command.name) {
        return Some(block);
    }
    if !command.client_permissions.is_empty()
        && let Some(guild) = ctx.guild()
    {
        let client = ctx.framework().client();
        let bot = client.current_user().id;
        match client.permissions_in(guild, ctx.channel(), bot).await {
            Ok(perms) => {
                let missing = perms.missing(&command.client_permissions);
                if !missing.is_empty() {
                    return Some(BlockReason::ClientPermissions { missing });
                }
            }
            Err(e) => {
                warn!(command = %command.name, error = %e, "could not resolve client permissions");
            }
        }
    }
    if let Some(remaining) = command.throttle_remaining(ctx.author().id) {
        return Some(BlockReason::Throttling { remaining });
    }
    None
}

async fn collect_args(ctx: &CommandContext, command: &Command) -> Result<ArgumentValues, CollectionFailure> {
    if let Some(collector) = command.collector() {
        if let Some(interaction) = ctx.interaction() {
            return collector.collect_structured(ctx, &interaction.options).await;
        }
        if ctx.mode() != EntryMode::Pattern {
            let count = (!collector.has_infinite()).then(|| collector.args().len());
            let provided = parse_args(ctx.arg_string().trim(), count, command.args_single_quotes);
            let mode = CollectMode::Conversational { prompt_limit: None };
            return collector.obtain(ctx, &provided, mode).await.map(|c| c.values);
        }
    }

    let mut values = ArgumentValues::new();
    if ctx.mode() == EntryMode::Pattern {
        let matches = ctx
            .pattern_matches()
            .iter()
            .map(|m| ArgValue::String(m.clone().unwrap_or_default()))
            .collect();
        values.insert("matches", ArgValue::List(matches));
        return Ok(values);
    }
    if let Some(interaction) = ctx.interaction() {
        for option in &interaction.options {
            values.insert(option.name.clone(), ArgValue::from_option(&option.value));
        }
        return Ok(values);
    }

    let raw = ctx.arg_string().trim();
    match command.args_type {
        crate::commands::ArgsType::Single => {
            values.insert(
                "args",
                ArgValue::String(strip_quotes(raw, command.args_single_quotes).to_string()),
            );
        }
        crate::commands::ArgsType::Multiple => {
            let tokens = parse_args(raw, command.args_count, command.args_single_quotes)
                .into_iter()
                .map(ArgValue::String)
                .collect();
            values.insert("args", ArgValue::List(tokens));
        }
    }
    Ok(values)
}

async fn report_failure(ctx: &CommandContext, command: &Command, failure: CollectionFailure) -> DispatchOutcome {
    if let FailureReason::Cancelled(reason) = failure.reason
        && !failure.prompts.is_empty()
    {
        ctx.framework().events().emit(FrameworkEvent::CommandCancel {
            command: command.name.clone(),
            user: ctx.author().id,
            reason: format!("{:?}", reason).to_lowercase(),
        });
        send_reply(ctx, "Cancelled command.").await;
        return DispatchOutcome::Cancelled;
    }

    debug!(command = %command.name, argument = %failure.key, reason = ?failure.reason, "invalid arguments");
    send_reply(ctx, &format_error(ctx, command)).await;
    DispatchOutcome::InvalidArguments
}

/// "Invalid command usage" reply showing the accepted format.
pub fn format_error(ctx: &CommandContext, command: &Command) -> String {
    let help = format!("help {}", command.name);
    let (usage, help_usage) = if ctx.guild().is_some() {
        (ctx.usage(None), ctx.any_usage(&help))
    } else {
        (
            command.usage(None, None, None),
            guard::usage(&help, None, None),
        )
    };
    format!(
        "Invalid command usage. The `{}` command's accepted format is: {}. Use {} for more information.",
        command.name, usage, help_usage
    )
}

async fn send_reply(ctx: &CommandContext, text: &str) {
    if let Err(e) = ctx.reply(text).await {
        warn!(error = %e, "failed to send reply");
    }
}
