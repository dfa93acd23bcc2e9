//! `disable`: turn a command or group off.

use super::{admin_or_owner, command_or_group_arg, describe};
use crate::commands::{ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandSource, PermissionCheck};
use crate::error::{CommandError, CommandResult};
use crate::types::ArgValue;
use async_trait::async_trait;

pub fn info() -> CommandInfo {
    CommandInfo::new(
        "disable",
        "commands",
        "Disables a command or command group.",
    )
    .aliases(["disable-command", "cmd-off", "command-off"])
    .details("The argument must be the name/ID (partial or whole) of a command or command group. Only administrators may use this command.")
    .example("disable util")
    .example("disable Utility")
    .example("disable prefix")
    .arg(command_or_group_arg("disable"))
    .guarded()
}

pub fn source() -> CommandSource {
    CommandSource::new(info(), Disable)
}

pub struct Disable;

#[async_trait]
impl CommandHandler for Disable {
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

        let (enabled, guarded) = match target {
            ArgValue::Command(c) => (c.is_enabled_in(guild, true), c.guarded),
            ArgValue::Group(g) => (g.is_enabled_in(guild), g.guarded),
            _ => return Err(CommandError::Internal("unexpected target".into())),
        };
        let reply = if !enabled {
            format!("The `{}` {} is already disabled.", name, noun)
        } else if guarded {
            format!("You cannot disable the `{}` {}.", name, noun)
        } else {
            match target {
                ArgValue::Command(c) => c.set_enabled_in(guild, false)?,
                ArgValue::Group(g) => g.set_enabled_in(guild, false)?,
                _ => {}
            }
            format!("Disabled the `{}` {}.", name, noun)
        };
        ctx.reply(&reply).await?;
        Ok(())
    }
}
