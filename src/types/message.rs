//! Messages in the current channel, by id.

use super::{ArgValue, ArgumentType, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::{Message, MessageId};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageType;

async fn fetch(value: &str, ctx: &CommandContext) -> Option<Message> {
    let id: MessageId = value.trim().parse().ok()?;
    match ctx.framework().client().fetch_message(ctx.channel().id, id).await {
        Ok(found) => found,
        Err(e) => {
            debug!(message = %id, error = %e, "message lookup failed");
            None
        }
    }
}

#[async_trait]
impl ArgumentType for MessageType {
    fn id(&self) -> &str {
        "message"
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        Validation::from(fetch(value, ctx).await.is_some())
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        fetch(value, ctx)
            .await
            .map(ArgValue::Message)
            .ok_or_else(|| "That message could not be found.".to_string())
    }
}
