//! Command token extraction.
//!
//! A message addresses the bot either with the guild's prefix (`!ping`),
//! with a mention of the bot (`@Bot ping`, optionally followed by the
//! prefix), or, in direct messages, with nothing at all.

use crate::commands::EntryMode;
use commando_model::UserId;
use dashmap::DashMap;
use regex::Regex;
use tracing::warn;

/// A message that addressed the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub mode: EntryMode,
    /// The lowercased command token.
    pub token: String,
    /// Everything after the token, untrimmed.
    pub arg_string: String,
    /// The text before the token (prefix and/or mention).
    pub lead: String,
}

/// Builds and caches one pattern per prefix.
#[derive(Debug)]
pub struct Matcher {
    bot: UserId,
    patterns: DashMap<String, Regex>,
    prefixless: Regex,
}

impl Matcher {
    pub fn new(bot: UserId) -> Self {
        Self {
            bot,
            patterns: DashMap::new(),
            prefixless: Regex::new(r"^()(\S+)").expect("static regex"),
        }
    }

    fn build(&self, prefix: &str) -> Option<Regex> {
        let source = if prefix.is_empty() {
            format!(r"(?i)^(<@!?{}>\s+)(\S+)", self.bot)
        } else {
            let p = regex::escape(prefix);
            format!(r"(?i)^(<@!?{id}>\s+(?:{p}\s*)?|{p}\s*)(\S+)", id = self.bot, p = p)
        };
        match Regex::new(&source) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(prefix = %prefix, error = %e, "failed to build command pattern");
                None
            }
        }
    }

    fn pattern(&self, prefix: &str) -> Option<Regex> {
        if let Some(re) = self.patterns.get(prefix) {
            return Some(re.clone());
        }
        let re = self.build(prefix)?;
        self.patterns.insert(prefix.to_string(), re.clone());
        Some(re)
    }

    fn extract(re: &Regex, content: &str, mode: impl Fn(&str) -> EntryMode) -> Option<Matched> {
        let caps = re.captures(content)?;
        let lead = caps.get(1)?;
        let token = caps.get(2)?;
        Some(Matched {
            mode: mode(lead.as_str()),
            token: token.as_str().to_lowercase(),
            arg_string: content[token.end()..].to_string(),
            lead: lead.as_str().to_string(),
        })
    }

    /// Match `content` against `prefix` (`None` or empty: mentions only).
    pub fn matches(&self, content: &str, prefix: Option<&str>) -> Option<Matched> {
        let re = self.pattern(prefix.unwrap_or(""))?;
        Self::extract(&re, content, |lead| {
            if lead.starts_with("<@") {
                EntryMode::Mention
            } else {
                EntryMode::Prefix
            }
        })
    }

    /// Treat the first word as the command token.
    pub fn matches_prefixless(&self, content: &str) -> Option<Matched> {
        Self::extract(&self.prefixless, content, |_| EntryMode::DirectMessage)
    }
}
