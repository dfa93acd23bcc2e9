//! `groups`: list every group and whether it is enabled here.

use super::admin_or_owner;
use crate::commands::{ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandSource, PermissionCheck};
use crate::error::CommandResult;
use async_trait::async_trait;

pub fn info() -> CommandInfo {
    CommandInfo::new("groups", "commands", "Lists all command groups.")
        .aliases(["list-groups", "show-groups"])
        .details("Only administrators may use this command.")
        .guarded()
}

pub fn source() -> CommandSource {
    CommandSource::new(info(), Groups)
}

pub struct Groups;

#[async_trait]
impl CommandHandler for Groups {
    async fn has_permission(&self, ctx: &CommandContext) -> PermissionCheck {
        admin_or_owner(ctx).await
    }

    async fn run(&self, ctx: &CommandContext, _args: ArgumentValues) -> CommandResult {
        let guild = ctx.guild_id();
        let lines: Vec<String> = ctx
            .framework()
            .registry()
            .groups()
            .iter()
            .map(|g| {
                let state = if g.is_enabled_in(guild) { "Enabled" } else { "Disabled" };
                format!("**{}:** {}", g.name, state)
            })
            .collect();
        ctx.reply(&format!("__**Groups**__\n{}", lines.join("\n"))).await?;
        Ok(())
    }
}
