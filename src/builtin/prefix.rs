//! `prefix`: show or change the command prefix.
//!
//! In a guild the change applies to that guild and needs administrator
//! rights; in a DM it changes the global default and needs an owner.

use super::is_admin;
use crate::commands::{ArgumentInfo, ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandSource};
use crate::error::CommandResult;
use async_trait::async_trait;

pub fn info() -> CommandInfo {
    CommandInfo::new(
        "prefix",
        "util",
        "Shows or sets the command prefix.",
    )
    .format("[prefix/\"default\"/\"none\"]")
    .details("If no prefix is provided, the current prefix will be shown. If the prefix is \"default\", the prefix will be reset to the bot's default prefix. If the prefix is \"none\", the prefix will be removed entirely, only allowing mentions to run commands. Only administrators may change the prefix.")
    .example("prefix")
    .example("prefix -")
    .example("prefix omg!")
    .example("prefix default")
    .example("prefix none")
    .arg(
        ArgumentInfo::new("prefix", "string", "What would you like to set the bot's prefix to?")
            .max(15.0)
            .default_value(""),
    )
}

pub fn source() -> CommandSource {
    CommandSource::new(info(), Prefix)
}

pub struct Prefix;

#[async_trait]
impl CommandHandler for Prefix {
    async fn run(&self, ctx: &CommandContext, args: ArgumentValues) -> CommandResult {
        let framework = ctx.framework();
        let guild = ctx.guild_id();
        let requested = args.str("prefix").unwrap_or("").trim();

        if requested.is_empty() {
            let current = match framework.prefix_for(guild) {
                Some(p) => format!("The command prefix is `{}`.", p),
                None => "There is no command prefix.".to_string(),
            };
            ctx.reply(&format!(
                "{}\nTo run commands, use {}.",
                current,
                ctx.any_usage("command")
            ))
            .await?;
            return Ok(());
        }

        let owner = framework.is_owner(ctx.author().id);
        if guild.is_some() {
            if !owner && !is_admin(ctx).await {
                ctx.reply("Only administrators may change the command prefix.").await?;
                return Ok(());
            }
        } else if !owner {
            ctx.reply("Only the bot owner(s) may change the global command prefix.")
                .await?;
            return Ok(());
        }

        let lowercase = requested.to_lowercase();
        let response = if lowercase == "default" {
            framework.set_prefix(guild, None);
            let current = match framework.prefix_for(None) {
                Some(p) => format!("`{}`", p),
                None => "no prefix".to_string(),
            };
            format!("Reset the command prefix to the default (currently {}).", current)
        } else if lowercase == "none" {
            framework.set_prefix(guild, Some(String::new()));
            "Removed the command prefix entirely.".to_string()
        } else {
            framework.set_prefix(guild, Some(requested.to_string()));
            format!("Set the command prefix to `{}`.", requested)
        };

        ctx.reply(&format!(
            "{} To run commands, use {}.",
            response,
            ctx.any_usage("command")
        ))
        .await?;
        Ok(())
    }
}
