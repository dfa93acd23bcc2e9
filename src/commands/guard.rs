//! Guard outcomes and the replies they map to.

use commando_model::{Permission, User};
use std::time::Duration;

/// Why a command did not run.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockReason {
    /// Used outside a guild.
    GuildOnly,
    /// Used outside an NSFW channel.
    Nsfw,
    /// Owner-only command run by someone else.
    OwnerOnly,
    /// The invoking user may not run the command.
    Permission { response: Option<String> },
    /// The bot lacks permissions it needs in the channel.
    ClientPermissions { missing: Vec<Permission> },
    /// The user exhausted the throttle window.
    Throttling { remaining: Duration },
    /// Application-defined reason. Produces no reply by default.
    Custom(String),
}

impl BlockReason {
    /// Stable reason code.
    pub fn code(&self) -> &str {
        match self {
            Self::GuildOnly => "guildOnly",
            Self::Nsfw => "nsfw",
            Self::OwnerOnly => "ownerOnly",
            Self::Permission { .. } => "permission",
            Self::ClientPermissions { .. } => "clientPermissions",
            Self::Throttling { .. } => "throttling",
            Self::Custom(code) => code,
        }
    }

    /// The reply for `command`, or `None` to block silently.
    pub fn message(&self, command: &str) -> Option<String> {
        match self {
            Self::GuildOnly => Some(format!(
                "The `{}` command must be used in a server channel.",
                command
            )),
            Self::Nsfw => Some(format!(
                "The `{}` command can only be used in NSFW channels.",
                command
            )),
            Self::OwnerOnly => Some(format!(
                "The `{}` command can only be used by the bot owner.",
                command
            )),
            Self::Permission { response } => Some(response.clone().unwrap_or_else(|| {
                format!("You do not have permission to use the `{}` command.", command)
            })),
            Self::ClientPermissions { missing } => Some(match missing.as_slice() {
                [one] => format!(
                    "I need the \"{}\" permission for the `{}` command to work.",
                    one.label(),
                    command
                ),
                many => format!(
                    "I need the following permissions for the `{}` command to work: {}",
                    command,
                    labels(many)
                ),
            }),
            Self::Throttling { remaining } => Some(format!(
                "You may not use the `{}` command again for another {:.1} seconds.",
                command,
                remaining.as_secs_f64()
            )),
            Self::Custom(_) => None,
        }
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    Granted,
    /// Owner-only command run by a non-owner.
    OwnerOnly,
    /// The user lacks these permissions in the channel.
    Missing(Vec<Permission>),
    /// Refused with a custom message.
    Denied(String),
}

impl PermissionCheck {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Convert a refusal into a block reason with its reply text.
    pub fn into_block(self, command: &str) -> Option<BlockReason> {
        let response = match self {
            Self::Granted => return None,
            Self::OwnerOnly => return Some(BlockReason::OwnerOnly),
            Self::Missing(missing) => match missing.as_slice() {
                [one] => format!(
                    "The `{}` command requires you to have the \"{}\" permission.",
                    command,
                    one.label()
                ),
                many => format!(
                    "The `{}` command requires you to have the following permissions: {}",
                    command,
                    labels(many)
                ),
            },
            Self::Denied(message) => message,
        };
        Some(BlockReason::Permission {
            response: Some(response),
        })
    }
}

fn labels(perms: &[Permission]) -> String {
    perms.iter().map(|p| p.label()).collect::<Vec<_>>().join(", ")
}

/// Render how to invoke `command`.
///
/// With a prefix and/or bot user, spaces become non-breaking so the
/// rendered code span does not wrap.
pub fn usage(command: &str, prefix: Option<&str>, user: Option<&User>) -> String {
    let command = command.replace(' ', "\u{a0}");
    let prefix = prefix.filter(|p| !p.is_empty());
    if prefix.is_none() && user.is_none() {
        return format!("`{}`", command);
    }

    let prefix_part = prefix.map(|p| {
        let mut p = p.to_string();
        if p.chars().count() > 1 && !p.ends_with(' ') {
            p.push(' ');
        }
        format!("`{}{}`", p.replace(' ', "\u{a0}"), command)
    });
    let mention_part =
        user.map(|u| format!("`@{}\u{a0}{}`", u.tag().replace(' ', "\u{a0}"), command));

    match (prefix_part, mention_part) {
        (Some(p), Some(m)) => format!("{} or {}", p, m),
        (Some(p), None) => p,
        (None, Some(m)) => m,
        (None, None) => format!("`{}`", command),
    }
}

/// Generic reply for a failed handler. Never includes error details.
pub fn error_reply(invite: Option<&str>) -> String {
    let contact = match invite {
        Some(invite) => format!("Please contact the bot owner in this server: {}", invite),
        None => "Please contact the bot owner.".to_string(),
    };
    format!(
        "An error occurred while running the command.\nYou shouldn't ever receive an error like this.\n{}",
        contact
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_messages() {
        assert_eq!(
            BlockReason::GuildOnly.message("ban").unwrap(),
            "The `ban` command must be used in a server channel."
        );
        assert_eq!(
            BlockReason::Permission { response: None }.message("ban").unwrap(),
            "You do not have permission to use the `ban` command."
        );
        assert_eq!(
            BlockReason::ClientPermissions {
                missing: vec![Permission::BanMembers]
            }
            .message("ban")
            .unwrap(),
            "I need the \"Ban members\" permission for the `ban` command to work."
        );
        assert_eq!(
            BlockReason::Throttling {
                remaining: Duration::from_millis(4200)
            }
            .message("ping")
            .unwrap(),
            "You may not use the `ping` command again for another 4.2 seconds."
        );
    }

    #[test]
    fn test_custom_reason_is_silent() {
        let reason = BlockReason::Custom("maintenance".into());
        assert_eq!(reason.code(), "maintenance");
        assert!(reason.message("ban").is_none());
    }

    #[test]
    fn test_missing_permissions_response() {
        let block = PermissionCheck::Missing(vec![Permission::KickMembers, Permission::BanMembers])
            .into_block("ban")
            .unwrap();
        assert_eq!(
            block.message("ban").unwrap(),
            "The `ban` command requires you to have the following permissions: Kick members, Ban members"
        );
        assert!(PermissionCheck::Granted.into_block("ban").is_none());
    }

    #[test]
    fn test_owner_only_has_its_own_code() {
        let block = PermissionCheck::OwnerOnly.into_block("eval").unwrap();
        assert_eq!(block, BlockReason::OwnerOnly);
        assert_eq!(block.code(), "ownerOnly");
        assert_eq!(
            block.message("eval").unwrap(),
            "The `eval` command can only be used by the bot owner."
        );
        let denied = PermissionCheck::Denied("Nope.".into()).into_block("eval").unwrap();
        assert_eq!(denied.code(), "permission");
    }

    #[test]
    fn test_usage_forms() {
        let bot = User::new(5u64, "Bot");
        assert_eq!(usage("help", None, None), "`help`");
        assert_eq!(usage("help", Some("!"), None), "`!help`");
        assert_eq!(usage("help me", Some("bot"), None), "`bot\u{a0}help\u{a0}me`");
        assert_eq!(
            usage("help", Some("!"), Some(&bot)),
            "`!help` or `@Bot\u{a0}help`"
        );
    }

    #[test]
    fn test_error_reply_hides_details() {
        let reply = error_reply(Some("https://example.invalid/x"));
        assert!(reply.starts_with("An error occurred while running the command."));
        assert!(reply.ends_with("in this server: https://example.invalid/x"));
    }
}
