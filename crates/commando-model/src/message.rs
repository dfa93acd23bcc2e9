//! Text messages.

use crate::channel::Channel;
use crate::guild::Guild;
use crate::ids::{GuildId, MessageId};
use crate::user::{Member, User};
use std::sync::Arc;

/// A text message delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Message id.
    pub id: MessageId,
    /// Who sent it.
    pub author: User,
    /// Raw text content.
    pub content: String,
    /// Channel it was sent in.
    pub channel: Channel,
    /// Guild snapshot, absent for direct messages.
    #[cfg_attr(feature = "serde", serde(default))]
    pub guild: Option<Arc<Guild>>,
    /// Users mentioned in the content.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mentions: Vec<User>,
    /// Whether the message was posted through a webhook.
    #[cfg_attr(feature = "serde", serde(default))]
    pub webhook: bool,
}

impl Message {
    /// A message in a direct-message channel.
    pub fn new(id: impl Into<MessageId>, author: User, content: impl Into<String>, channel: Channel) -> Self {
        Self {
            id: id.into(),
            author,
            content: content.into(),
            channel,
            guild: None,
            mentions: Vec::new(),
            webhook: false,
        }
    }

    /// Attach a guild snapshot.
    pub fn in_guild(mut self, guild: Arc<Guild>) -> Self {
        self.guild = Some(guild);
        self
    }

    /// Id of the owning guild, if any.
    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild.as_ref().map(|g| g.id)
    }

    /// The author's membership in the guild, if cached.
    pub fn member(&self) -> Option<&Member> {
        self.guild.as_ref()?.member(self.author.id)
    }
}
