//! Users and guild members.

use crate::ids::{RoleId, UserId};
use std::fmt;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Account name.
    pub username: String,
    /// Legacy four-digit discriminator, if the platform still uses one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub discriminator: Option<String>,
    /// Whether the account is an automated bot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bot: bool,
}

impl User {
    /// Create a human user with no discriminator.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            discriminator: None,
            bot: false,
        }
    }

    /// Mark this user as a bot account.
    pub fn into_bot(mut self) -> Self {
        self.bot = true;
        self
    }

    /// `name#1234` when a discriminator is present, the bare name otherwise.
    pub fn tag(&self) -> String {
        match &self.discriminator {
            Some(d) => format!("{}#{}", self.username, d),
            None => self.username.clone(),
        }
    }

    /// The mention string for this user.
    pub fn mention(&self) -> String {
        crate::mention::user(self.id)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// A user's membership in a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// The underlying account.
    pub user: User,
    /// Guild-specific nickname.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nickname: Option<String>,
    /// Roles held in the guild.
    #[cfg_attr(feature = "serde", serde(default))]
    pub roles: Vec<RoleId>,
}

impl Member {
    /// Wrap a user with no nickname or roles.
    pub fn new(user: User) -> Self {
        Self {
            user,
            nickname: None,
            roles: Vec::new(),
        }
    }

    /// Nickname if set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user.username)
    }
}
