//! Mention syntax parsing.
//!
//! Users are mentioned as `<@id>` or `<@!id>`, roles as `<@&id>`, channels
//! as `<#id>` and custom emoji as `<:name:id>` / `<a:name:id>`.

use crate::ids::{ChannelId, EmojiId, RoleId, UserId};

fn strip_wrapped<'a>(s: &'a str, open: &str) -> Option<&'a str> {
    s.strip_prefix(open)?.strip_suffix('>')
}

/// Parse a user mention (`<@id>` or `<@!id>`).
pub fn parse_user(s: &str) -> Option<UserId> {
    let inner = strip_wrapped(s, "<@")?;
    let inner = inner.strip_prefix('!').unwrap_or(inner);
    inner.parse().ok()
}

/// Parse a role mention (`<@&id>`).
pub fn parse_role(s: &str) -> Option<RoleId> {
    strip_wrapped(s, "<@&")?.parse().ok()
}

/// Parse a channel mention (`<#id>`).
pub fn parse_channel(s: &str) -> Option<ChannelId> {
    strip_wrapped(s, "<#")?.parse().ok()
}

/// Parse a custom emoji reference, returning its name, id and animation flag.
pub fn parse_custom_emoji(s: &str) -> Option<(&str, EmojiId, bool)> {
    let (inner, animated) = match strip_wrapped(s, "<a:") {
        Some(inner) => (inner, true),
        None => (strip_wrapped(s, "<:")?, false),
    };
    let (name, id) = inner.rsplit_once(':')?;
    if name.is_empty() {
        return None;
    }
    Some((name, id.parse().ok()?, animated))
}

/// Render a user mention.
pub fn user(id: UserId) -> String {
    format!("<@{}>", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_mentions() {
        assert_eq!(parse_user("<@123>"), Some(UserId(123)));
        assert_eq!(parse_user("<@!123>"), Some(UserId(123)));
        assert_eq!(parse_user("<@&123>"), None);
        assert_eq!(parse_user("@123"), None);
        assert_eq!(user(UserId(5)), "<@5>");
    }

    #[test]
    fn test_role_and_channel_mentions() {
        assert_eq!(parse_role("<@&55>"), Some(RoleId(55)));
        assert_eq!(parse_channel("<#77>"), Some(ChannelId(77)));
        assert_eq!(parse_channel("#77"), None);
    }

    #[test]
    fn test_custom_emoji() {
        assert_eq!(
            parse_custom_emoji("<:blob:42>"),
            Some(("blob", EmojiId(42), false))
        );
        assert_eq!(
            parse_custom_emoji("<a:party:43>"),
            Some(("party", EmojiId(43), true))
        );
        assert_eq!(parse_custom_emoji("<::43>"), None);
        assert_eq!(parse_custom_emoji(":blob:"), None);
    }
}
