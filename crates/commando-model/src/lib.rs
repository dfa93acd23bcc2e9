//! # commando-model
//!
//! The chat-platform object model consumed by the `commando` command
//! framework. Everything in here is plain data: identifiers, users and
//! members, guilds with their cached roles/channels/emoji, messages,
//! structured interactions, and the fixed permission vocabulary.
//!
//! The gateway connection that produces these values is not part of this
//! crate. A host process builds them from whatever client library it uses
//! and hands them to the framework.
//!
//! ## Quick Start
//!
//! ```rust
//! use commando_model::{Permission, Permissions, UserId, mention};
//!
//! let id: UserId = "80351110224678912".parse().unwrap();
//! assert_eq!(mention::parse_user("<@!80351110224678912>"), Some(id));
//!
//! let perms = Permissions::from_iter([Permission::SendMessages, Permission::ViewChannel]);
//! assert!(perms.contains(Permission::SendMessages));
//! assert_eq!(perms.missing(&[Permission::BanMembers]), vec![Permission::BanMembers]);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod channel;
pub mod guild;
pub mod ids;
pub mod interaction;
pub mod mention;
pub mod message;
pub mod permissions;
pub mod user;

pub use channel::{Channel, ChannelKind};
pub use guild::{Emoji, Guild, Role};
pub use ids::{ChannelId, EmojiId, GuildId, InteractionId, MessageId, ParseIdError, RoleId, UserId};
pub use interaction::{Interaction, InteractionKind, InteractionOption, OptionValue};
pub use message::Message;
pub use permissions::{Permission, Permissions, UnknownPermission};
pub use user::{Member, User};
