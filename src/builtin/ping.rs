//! `ping`: measure reply latency.

use crate::commands::{ArgumentValues, CommandContext, CommandHandler, CommandInfo, CommandSource};
use crate::error::CommandResult;
use async_trait::async_trait;
use tokio::time::Instant;

pub fn info() -> CommandInfo {
    CommandInfo::new("ping", "util", "Checks the bot's ping to the chat server.")
        .throttling(5, 10)
}

pub fn source() -> CommandSource {
    CommandSource::new(info(), Ping)
}

pub struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    async fn run(&self, ctx: &CommandContext, _args: ArgumentValues) -> CommandResult {
        let started = Instant::now();
        ctx.reply("Pinging...").await?;
        let elapsed = started.elapsed().as_millis();
        ctx.reply(&format!("Pong! The message round-trip took {}ms.", elapsed))
            .await?;
        Ok(())
    }
}
