//! Snowflake-style identifiers.
//!
//! Every platform object is keyed by an opaque 64-bit id. Each kind gets
//! its own newtype so a role id can never be passed where a user id is
//! expected.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string is not a valid numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid id: {0:?}")]
pub struct ParseIdError(pub String);

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw id.
            #[inline]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw numeric value.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseIdError(s.to_string()));
                }
                s.parse::<u64>()
                    .map(Self)
                    .map_err(|_| ParseIdError(s.to_string()))
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Identifies a user account.
    UserId
);
define_id!(
    /// Identifies a guild (server).
    GuildId
);
define_id!(
    /// Identifies a channel.
    ChannelId
);
define_id!(
    /// Identifies a message within a channel.
    MessageId
);
define_id!(
    /// Identifies a guild role.
    RoleId
);
define_id!(
    /// Identifies a custom emoji.
    EmojiId
);
define_id!(
    /// Identifies a structured interaction.
    InteractionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!("42".parse::<UserId>(), Ok(UserId(42)));
        assert!("".parse::<UserId>().is_err());
        assert!("-1".parse::<GuildId>().is_err());
        assert!("12a".parse::<RoleId>().is_err());
        assert!("99999999999999999999999".parse::<ChannelId>().is_err());
    }

    #[test]
    fn test_display_round_trips_raw_value() {
        assert_eq!(MessageId::new(7).to_string(), "7");
        assert_eq!(EmojiId::from(9).get(), 9);
    }
}
