//! Channels.

use crate::ids::{ChannelId, GuildId};

/// What kind of channel this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChannelKind {
    /// Guild text channel.
    Text,
    /// Guild announcement channel.
    News,
    /// Guild voice channel.
    Voice,
    /// Guild category grouping other channels.
    Category,
    /// Direct message with one user.
    Dm,
    /// Direct message with several users.
    GroupDm,
}

impl ChannelKind {
    /// Whether messages can be sent in this kind of channel.
    pub const fn is_text_based(self) -> bool {
        matches!(self, Self::Text | Self::News | Self::Dm | Self::GroupDm)
    }

    /// Whether this kind of channel belongs to a guild.
    pub const fn is_guild(self) -> bool {
        matches!(self, Self::Text | Self::News | Self::Voice | Self::Category)
    }
}

/// A channel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    /// Channel id.
    pub id: ChannelId,
    /// Name, absent for direct messages.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Channel kind.
    pub kind: ChannelKind,
    /// Owning guild for guild channels.
    #[cfg_attr(feature = "serde", serde(default))]
    pub guild_id: Option<GuildId>,
    /// Whether the channel is marked age-restricted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nsfw: bool,
}

impl Channel {
    /// A guild text channel.
    pub fn text(id: impl Into<ChannelId>, guild_id: GuildId, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            kind: ChannelKind::Text,
            guild_id: Some(guild_id),
            nsfw: false,
        }
    }

    /// A direct-message channel.
    pub fn dm(id: impl Into<ChannelId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind: ChannelKind::Dm,
            guild_id: None,
            nsfw: false,
        }
    }

    /// Whether this is a guild channel (as opposed to a DM).
    pub fn is_guild(&self) -> bool {
        self.kind.is_guild()
    }

    /// The channel mention string.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}
