//! `enable`: turn a command or group back on.

use super::{admin_or_owner, command_or_group_arg, describe};
use crate::commands::{ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandSource, PermissionCheck};
use crate::error::{CommandError, CommandResult};
use crate::types::ArgValue;
use async_trait::async_trait;

pub fn info() -> CommandInfo {
    CommandInfo::new(
        "enable",
        "commands",
        "Enables a command or command group.",
    )
    .aliases(["enable-command", "cmd-on", "command-on"])
    .details("The argument must be the name/ID (partial or whole) of a command or command group. Only administrators may use this command.")
    .example("enable util")
    .example("enable Utility")
    .example("enable prefix")
    .arg(command_or_group_arg("enable"))
    .guarded()
}

pub fn source() -> CommandSource {
    CommandSource::new(info(), Enable)
}

pub struct Enable;

#[async_trait]
impl CommandHandler for Enable {
    async fn has_permission(&self, ctx: &CommandContext) -> PermissionCheck {
        admin_or_owner(ctx).await
    }

    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        let target = args
            .get("target")
            .ok_or_else(|| CommandError::Internal("missing target".into()))?;
        let (name, noun) =
            describe(target).ok_or_else(|| CommandError::Internal("unexpected target".into()))?;
        let guild = ctx.guild_id();

        let (enabled, group) = match target {
            ArgValue::Command(c) => (c.is_enabled_in(guild, true), c.group().cloned()),
            ArgValue::Group(g) => (g.is_enabled_in(guild), None),
            _ => return Err(CommandError::Internal("unexpected target".into())),
        };
        if !enabled {
            match target {
                ArgValue::Command(c) => c.set_enabled_in(guild, true)?,
                ArgValue::Group(g) => g.set_enabled_in(guild, true)?,
                _ => {}
            }
        }

        let caveat = match group {
            Some(g) if !g.is_enabled_in(guild) => format!(
                ", but the `{}` group is disabled, so it still can't be used",
                g.name
            ),
            _ => String::new(),
        };
        let reply = if enabled {
            format!("The `{}` {} is already enabled{}.", name, noun, caveat)
        } else {
            format!("Enabled the `{}` {}{}.", name, noun, caveat)
        };
        ctx.reply(&reply).await?;
        Ok(())
    }
}
