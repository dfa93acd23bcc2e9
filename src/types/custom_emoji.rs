//! Custom guild emoji.

use super::{search, ArgValue, ArgumentType, Lookup, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::{mention, Emoji};

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomEmojiType;

fn lookup(value: &str, ctx: &CommandContext) -> Lookup<Emoji> {
    let Some(guild) = ctx.guild() else {
        return Lookup::NotFound;
    };
    if let Some((_, id, _)) = mention::parse_custom_emoji(value) {
        return guild.emoji(id).cloned().map_or(Lookup::NotFound, Lookup::Found);
    }
    let query = value.trim_matches(':');
    search(&guild.emojis, query, "emojis", |e: &Emoji| vec![e.name.clone()])
}

#[async_trait]
impl ArgumentType for CustomEmojiType {
    fn id(&self) -> &str {
        "custom-emoji"
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        lookup(value, ctx).validation()
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        lookup(value, ctx).into_result("emojis").map(ArgValue::Emoji)
    }
}
