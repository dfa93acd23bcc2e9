//! commando-console - drive the framework from a terminal.
//!
//! Every stdin line is delivered as a direct message from a console user,
//! and every reply is printed to stdout. Handy for trying commands and
//! argument prompts without a chat gateway.

use async_trait::async_trait;
use commando::config::validate;
use commando::model::{Channel, ChannelId, Message, MessageId, User, UserId};
use commando::{ChatClient, ClientError, Config, Framework, ResponseTarget, SqliteProvider};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const BOT_ID: u64 = 1;
const CONSOLE_USER_ID: u64 = 2;
const CONSOLE_CHANNEL_ID: u64 = 1;

struct ConsoleClient {
    bot: User,
}

#[async_trait]
impl ChatClient for ConsoleClient {
    fn current_user(&self) -> &User {
        &self.bot
    }

    async fn send(&self, _target: ResponseTarget, content: &str) -> Result<(), ClientError> {
        println!("{}", content);
        Ok(())
    }

    async fn fetch_message(
        &self,
        _channel: ChannelId,
        _id: MessageId,
    ) -> Result<Option<Message>, ClientError> {
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None => Config::default(),
    };
    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    let client = Arc::new(ConsoleClient {
        bot: User::new(BOT_ID, "commando").into_bot(),
    });
    let framework = Framework::new(client, &config);
    framework.register_defaults()?;
    framework.owners().insert(UserId(CONSOLE_USER_ID));

    if let Some(settings) = &config.settings {
        let provider = SqliteProvider::connect(&settings.path).await?;
        framework.set_provider(Arc::new(provider)).await?;
    }

    info!(
        commands = framework.registry().commands().len(),
        prefix = ?framework.prefix_for(None),
        "Console ready; type commands, Ctrl-D to quit"
    );

    let user = User::new(CONSOLE_USER_ID, "console");
    let channel = Channel::dm(CONSOLE_CHANNEL_ID);
    let next_id = AtomicU64::new(1);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let message = Message::new(
            next_id.fetch_add(1, Ordering::Relaxed),
            user.clone(),
            line,
            channel.clone(),
        );
        // Prompt answers arrive on later lines, so dispatch must not block
        // the reader.
        let framework = Arc::clone(&framework);
        tokio::spawn(async move {
            let outcome = framework.handle_message(message).await;
            tracing::debug!(outcome = ?outcome, "Dispatched");
        });
    }

    framework.shutdown().await;
    Ok(())
}
