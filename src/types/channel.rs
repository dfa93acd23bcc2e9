//! Guild channels, optionally restricted to one kind.

use super::{search, ArgValue, ArgumentType, Lookup, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::{mention, Channel, ChannelId, ChannelKind, OptionValue};

/// Channel argument type. One instance per registered id.
#[derive(Debug, Clone, Copy)]
pub struct ChannelType {
    id: &'static str,
    label: &'static str,
    accepts: fn(ChannelKind) -> bool,
}

impl ChannelType {
    /// `channel`: any guild channel.
    pub fn any() -> Self {
        Self {
            id: "channel",
            label: "channels",
            accepts: ChannelKind::is_guild,
        }
    }

    /// `text-channel`: text and announcement channels.
    pub fn text() -> Self {
        Self {
            id: "text-channel",
            label: "text channels",
            accepts: |k| matches!(k, ChannelKind::Text | ChannelKind::News),
        }
    }

    /// `voice-channel`.
    pub fn voice() -> Self {
        Self {
            id: "voice-channel",
            label: "voice channels",
            accepts: |k| k == ChannelKind::Voice,
        }
    }

    /// `category-channel`.
    pub fn category() -> Self {
        Self {
            id: "category-channel",
            label: "categories",
            accepts: |k| k == ChannelKind::Category,
        }
    }

    fn lookup(&self, value: &str, ctx: &CommandContext) -> Lookup<Channel> {
        let Some(guild) = ctx.guild() else {
            return Lookup::NotFound;
        };
        let id: Option<ChannelId> = mention::parse_channel(value).or_else(|| value.parse().ok());
        if let Some(id) = id {
            return match guild.channel(id) {
                Some(channel) if (self.accepts)(channel.kind) => Lookup::Found(channel.clone()),
                _ => Lookup::NotFound,
            };
        }
        let candidates: Vec<Channel> = guild
            .channels
            .iter()
            .filter(|c| (self.accepts)(c.kind))
            .cloned()
            .collect();
        let query = value.strip_prefix('#').unwrap_or(value);
        search(&candidates, query, self.label, |c: &Channel| {
            c.name.iter().cloned().collect()
        })
    }
}

#[async_trait]
impl ArgumentType for ChannelType {
    fn id(&self) -> &str {
        self.id
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        self.lookup(value, ctx).validation()
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        self.lookup(value, ctx).into_result(self.label).map(ArgValue::Channel)
    }

    fn coerce_option(&self, value: &OptionValue, ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        let OptionValue::Channel(id) = value else {
            return None;
        };
        ctx.guild()?
            .channel(*id)
            .filter(|c| (self.accepts)(c.kind))
            .cloned()
            .map(ArgValue::Channel)
    }
}
