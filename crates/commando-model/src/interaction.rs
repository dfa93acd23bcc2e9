//! Structured interactions (slash-style invocations).
//!
//! The platform has already parsed the command name and typed the options,
//! so no string parsing happens for these.

use crate::channel::Channel;
use crate::guild::Guild;
use crate::ids::{ChannelId, GuildId, InteractionId, RoleId, UserId};
use crate::user::User;
use std::fmt;
use std::sync::Arc;

/// What kind of interaction was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InteractionKind {
    /// An application command invocation.
    Command,
    /// A button or select-menu click.
    Component,
    /// An autocomplete request.
    Autocomplete,
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "snake_case"))]
pub enum OptionValue {
    /// Free text.
    String(String),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Number(f64),
    /// True/false.
    Boolean(bool),
    /// A user picked from the client UI.
    User(UserId),
    /// A channel picked from the client UI.
    Channel(ChannelId),
    /// A role picked from the client UI.
    Role(RoleId),
}

impl fmt::Display for OptionValue {
    /// Renders the value the way a user would have typed it in a message.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::User(id) => write!(f, "<@{}>", id),
            Self::Channel(id) => write!(f, "<#{}>", id),
            Self::Role(id) => write!(f, "<@&{}>", id),
        }
    }
}

/// A named option.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteractionOption {
    /// Option name as declared by the command.
    pub name: String,
    /// Typed value.
    pub value: OptionValue,
}

/// A structured interaction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interaction {
    /// Interaction id, used to address the response.
    pub id: InteractionId,
    /// Kind of interaction.
    pub kind: InteractionKind,
    /// Declared command name.
    pub command_name: String,
    /// Typed options in the order the platform delivered them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: Vec<InteractionOption>,
    /// Invoking user.
    pub user: User,
    /// Channel the interaction happened in.
    pub channel: Channel,
    /// Guild snapshot, absent in direct messages.
    #[cfg_attr(feature = "serde", serde(default))]
    pub guild: Option<Arc<Guild>>,
}

impl Interaction {
    /// Whether this is an application command invocation.
    pub fn is_command(&self) -> bool {
        self.kind == InteractionKind::Command
    }

    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
            .map(|o| &o.value)
    }

    /// Id of the owning guild, if any.
    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild.as_ref().map(|g| g.id)
    }
}
