//! `unknown-command`: the fallback for unmatched input.

use crate::commands::{ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandSource, guard};
use crate::error::CommandResult;
use async_trait::async_trait;

pub fn info() -> CommandInfo {
    CommandInfo::new(
        "unknown-command",
        "util",
        "Displays help information for when an unknown command is used.",
    )
    .example("unknown-command kickeverybodyever")
    .unknown()
    .hidden()
}

pub fn source() -> CommandSource {
    CommandSource::new(info(), UnknownCommand)
}

pub struct UnknownCommand;

#[async_trait]
impl CommandHandler for UnknownCommand {
    async fn run(&self, ctx: &CommandContext, _args: ArgumentValues) -> CommandResult {
        let help = if ctx.guild().is_some() {
            ctx.any_usage("help")
        } else {
            guard::usage("help", None, None)
        };
        ctx.reply(&format!(
            "Unknown command. Use {} to view the command list.",
            help
        ))
        .await?;
        Ok(())
    }
}
