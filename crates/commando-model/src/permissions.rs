//! The fixed permission vocabulary.
//!
//! Permissions are platform-defined flags. They are named in
//! `SCREAMING_SNAKE_CASE` in descriptors and configuration
//! (`"MANAGE_MESSAGES"`) and rendered with a human label in replies
//! (`"Manage messages"`).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a permission name is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

macro_rules! permissions {
    ($($variant:ident = $bit:expr, $name:literal, $label:literal;)*) => {
        /// A single permission flag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[allow(missing_docs)]
        pub enum Permission {
            $($variant,)*
        }

        impl Permission {
            /// Every permission in the vocabulary, in bit order.
            pub const ALL: &'static [Permission] = &[$(Permission::$variant,)*];

            /// Bit position of this flag.
            #[inline]
            pub const fn bit(self) -> u64 {
                match self {
                    $(Permission::$variant => 1u64 << $bit,)*
                }
            }

            /// Canonical `SCREAMING_SNAKE_CASE` name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Permission::$variant => $name,)*
                }
            }

            /// Human-readable label used in user-facing replies.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Permission::$variant => $label,)*
                }
            }
        }

        impl FromStr for Permission {
            type Err = UnknownPermission;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Permission::$variant),)*
                    _ => Err(UnknownPermission(s.to_string())),
                }
            }
        }
    };
}

permissions! {
    CreateInstantInvite = 0, "CREATE_INSTANT_INVITE", "Create instant invite";
    KickMembers = 1, "KICK_MEMBERS", "Kick members";
    BanMembers = 2, "BAN_MEMBERS", "Ban members";
    Administrator = 3, "ADMINISTRATOR", "Administrator";
    ManageChannels = 4, "MANAGE_CHANNELS", "Manage channels";
    ManageGuild = 5, "MANAGE_GUILD", "Manage server";
    AddReactions = 6, "ADD_REACTIONS", "Add reactions";
    ViewAuditLog = 7, "VIEW_AUDIT_LOG", "View audit log";
    PrioritySpeaker = 8, "PRIORITY_SPEAKER", "Priority speaker";
    Stream = 9, "STREAM", "Video";
    ViewChannel = 10, "VIEW_CHANNEL", "Read text channels and see voice channels";
    SendMessages = 11, "SEND_MESSAGES", "Send messages";
    SendTtsMessages = 12, "SEND_TTS_MESSAGES", "Send TTS messages";
    ManageMessages = 13, "MANAGE_MESSAGES", "Manage messages";
    EmbedLinks = 14, "EMBED_LINKS", "Embed links";
    AttachFiles = 15, "ATTACH_FILES", "Attach files";
    ReadMessageHistory = 16, "READ_MESSAGE_HISTORY", "Read message history";
    MentionEveryone = 17, "MENTION_EVERYONE", "Mention everyone";
    UseExternalEmojis = 18, "USE_EXTERNAL_EMOJIS", "Use external emojis";
    ViewGuildInsights = 19, "VIEW_GUILD_INSIGHTS", "View server insights";
    Connect = 20, "CONNECT", "Connect";
    Speak = 21, "SPEAK", "Speak";
    MuteMembers = 22, "MUTE_MEMBERS", "Mute members";
    DeafenMembers = 23, "DEAFEN_MEMBERS", "Deafen members";
    MoveMembers = 24, "MOVE_MEMBERS", "Move members";
    UseVad = 25, "USE_VAD", "Use voice activity";
    ChangeNickname = 26, "CHANGE_NICKNAME", "Change nickname";
    ManageNicknames = 27, "MANAGE_NICKNAMES", "Manage nicknames";
    ManageRoles = 28, "MANAGE_ROLES", "Manage roles";
    ManageWebhooks = 29, "MANAGE_WEBHOOKS", "Manage webhooks";
    ManageEmojis = 30, "MANAGE_EMOJIS", "Manage emojis";
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Permission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Permission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A set of permission flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Permissions(u64);

impl Permissions {
    /// No permissions.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every permission in the vocabulary.
    pub fn all() -> Self {
        Permission::ALL.iter().copied().collect()
    }

    /// Build from a raw bit field, dropping unknown bits.
    pub fn from_bits_truncate(bits: u64) -> Self {
        Self(bits & Self::all().0)
    }

    /// The raw bit field.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `perm` is granted. `ADMINISTRATOR` implies every permission.
    #[inline]
    pub const fn contains(self, perm: Permission) -> bool {
        self.0 & Permission::Administrator.bit() != 0 || self.0 & perm.bit() != 0
    }

    /// Grant `perm`.
    #[inline]
    pub fn insert(&mut self, perm: Permission) {
        self.0 |= perm.bit();
    }

    /// Revoke `perm`.
    #[inline]
    pub fn remove(&mut self, perm: Permission) {
        self.0 &= !perm.bit();
    }

    /// The permissions from `required` that this set does not grant, in
    /// the order they were requested.
    pub fn missing(self, required: &[Permission]) -> Vec<Permission> {
        required
            .iter()
            .copied()
            .filter(|p| !self.contains(*p))
            .collect()
    }

    /// Iterate over the granted flags.
    pub fn iter(self) -> impl Iterator<Item = Permission> {
        Permission::ALL
            .iter()
            .copied()
            .filter(move |p| self.0 & p.bit() != 0)
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::empty();
        for perm in iter {
            set.insert(perm);
        }
        set
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for perm in Permission::ALL {
            assert_eq!(perm.name().parse::<Permission>(), Ok(*perm));
        }
        assert_eq!(
            "MANAGE_STUFF".parse::<Permission>(),
            Err(UnknownPermission("MANAGE_STUFF".into()))
        );
        // Names are case-sensitive
        assert!("send_messages".parse::<Permission>().is_err());
    }

    #[test]
    fn test_administrator_implies_all() {
        let admin = Permissions::from_iter([Permission::Administrator]);
        assert!(admin.contains(Permission::BanMembers));
        assert!(admin.missing(&[Permission::ManageRoles]).is_empty());
    }

    #[test]
    fn test_missing_preserves_request_order() {
        let perms = Permissions::from_iter([Permission::SendMessages]);
        assert_eq!(
            perms.missing(&[
                Permission::ManageRoles,
                Permission::SendMessages,
                Permission::KickMembers
            ]),
            vec![Permission::ManageRoles, Permission::KickMembers]
        );
    }

    #[test]
    fn test_from_bits_truncate_drops_unknown() {
        let perms = Permissions::from_bits_truncate(u64::MAX);
        assert_eq!(perms, Permissions::all());
        assert_eq!(perms.iter().count(), Permission::ALL.len());
    }
}
