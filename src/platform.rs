//! Boundary to the external chat client.
//!
//! The framework never talks to a gateway itself. A host wraps its client
//! library in a [`ChatClient`] and hands it to the [`Framework`](crate::Framework).

use async_trait::async_trait;
use commando_model::{
    Channel, ChannelId, Guild, InteractionId, Message, MessageId, Permissions, User, UserId,
};
use thiserror::Error;

/// Where a reply goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseTarget {
    /// A plain channel message.
    Channel(ChannelId),
    /// The response slot of a structured interaction.
    Interaction(InteractionId),
}

/// Errors reported by the chat client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing access to channel {0}")]
    MissingAccess(ChannelId),
    #[error("request failed: {0}")]
    Request(String),
}

/// The side effects the framework needs from a chat client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// The bot's own account.
    fn current_user(&self) -> &User;

    /// Send text to a channel or interaction.
    async fn send(&self, target: ResponseTarget, content: &str) -> Result<(), ClientError>;

    /// Effective permissions of `user` in a guild channel.
    async fn permissions_in(
        &self,
        guild: &Guild,
        _channel: &Channel,
        user: UserId,
    ) -> Result<Permissions, ClientError> {
        Ok(guild_permissions(guild, user))
    }

    /// Fetch a message by id.
    async fn fetch_message(
        &self,
        channel: ChannelId,
        id: MessageId,
    ) -> Result<Option<Message>, ClientError>;

    /// Fetch a user that is not in any cached guild.
    async fn fetch_user(&self, _id: UserId) -> Result<Option<User>, ClientError> {
        Ok(None)
    }
}

/// Guild-level permissions computed from a cache snapshot.
///
/// The guild owner holds everything. Otherwise the `@everyone` role (whose
/// id equals the guild id) is combined with each of the member's roles.
pub fn guild_permissions(guild: &Guild, user: UserId) -> Permissions {
    if guild.owner_id == user {
        return Permissions::all();
    }
    let mut perms = guild
        .roles
        .iter()
        .find(|r| r.id.get() == guild.id.get())
        .map(|r| r.permissions)
        .unwrap_or_default();
    if let Some(member) = guild.member(user) {
        for role in member.roles.iter().filter_map(|id| guild.role(*id)) {
            perms |= role.permissions;
        }
    }
    perms
}

#[cfg(test)]
mod tests {
    use super::*;
    use commando_model::{GuildId, Member, Permission, Role, RoleId};

    fn guild() -> Guild {
        let mut guild = Guild::new(GuildId(10), "test", UserId(1));
        guild.roles.push(Role {
            id: RoleId(10),
            name: "@everyone".into(),
            permissions: Permissions::from_iter([Permission::SendMessages]),
        });
        guild.roles.push(Role {
            id: RoleId(20),
            name: "mods".into(),
            permissions: Permissions::from_iter([Permission::ManageMessages]),
        });
        let mut member = Member::new(User::new(2u64, "alice"));
        member.roles.push(RoleId(20));
        guild.members.push(member);
        guild
    }

    #[test]
    fn test_owner_has_everything() {
        assert_eq!(guild_permissions(&guild(), UserId(1)), Permissions::all());
    }

    #[test]
    fn test_roles_are_combined_with_everyone() {
        let perms = guild_permissions(&guild(), UserId(2));
        assert!(perms.contains(Permission::SendMessages));
        assert!(perms.contains(Permission::ManageMessages));
        assert!(!perms.contains(Permission::BanMembers));
    }

    #[test]
    fn test_unknown_member_gets_everyone_only() {
        let perms = guild_permissions(&guild(), UserId(3));
        assert!(perms.contains(Permission::SendMessages));
        assert!(!perms.contains(Permission::ManageMessages));
    }
}
