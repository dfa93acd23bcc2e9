//! Guilds and their cached roles, members and emoji.
//!
//! A `Guild` is a snapshot of the platform cache at the time an event was
//! delivered. Argument types resolve mentions and names against it.

use crate::channel::Channel;
use crate::ids::{ChannelId, EmojiId, GuildId, RoleId, UserId};
use crate::permissions::Permissions;
use crate::user::Member;
use std::fmt;

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role {
    /// Role id.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Permissions granted by the role.
    #[cfg_attr(feature = "serde", serde(default))]
    pub permissions: Permissions,
}

impl Role {
    /// The role mention string.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

/// A custom emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Emoji {
    /// Emoji id.
    pub id: EmojiId,
    /// Emoji name.
    pub name: String,
    /// Whether the emoji is animated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub animated: bool,
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.animated {
            write!(f, "<a:{}:{}>", self.name, self.id)
        } else {
            write!(f, "<:{}:{}>", self.name, self.id)
        }
    }
}

/// A guild snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guild {
    /// Guild id.
    pub id: GuildId,
    /// Guild name.
    pub name: String,
    /// Owner of the guild.
    pub owner_id: UserId,
    /// Cached members.
    #[cfg_attr(feature = "serde", serde(default))]
    pub members: Vec<Member>,
    /// Cached roles.
    #[cfg_attr(feature = "serde", serde(default))]
    pub roles: Vec<Role>,
    /// Cached channels.
    #[cfg_attr(feature = "serde", serde(default))]
    pub channels: Vec<Channel>,
    /// Cached custom emoji.
    #[cfg_attr(feature = "serde", serde(default))]
    pub emojis: Vec<Emoji>,
}

impl Guild {
    /// An empty guild snapshot.
    pub fn new(id: impl Into<GuildId>, name: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id,
            members: Vec::new(),
            roles: Vec::new(),
            channels: Vec::new(),
            emojis: Vec::new(),
        }
    }

    /// Look up a cached member.
    pub fn member(&self, id: UserId) -> Option<&Member> {
        self.members.iter().find(|m| m.user.id == id)
    }

    /// Look up a cached role.
    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    /// Look up a cached channel.
    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Look up a cached emoji.
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.id == id)
    }
}
