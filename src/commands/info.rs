//! Declarative command descriptors.
//!
//! A [`CommandInfo`] is what a bot author writes, in code or as a TOML
//! manifest. It is checked once by [`Command::new`](super::Command::new)
//! and never consulted again.

use super::argument::ArgumentInfo;
use super::throttle::Throttling;
use crate::error::ValidationError;
use commando_model::Permission;
use regex::Regex;
use serde::Deserialize;

/// How the raw argument remainder is handed to a command without a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgsType {
    /// The whole remainder is one string.
    #[default]
    Single,
    /// The remainder is split into tokens.
    Multiple,
}

fn default_true() -> bool {
    true
}

/// Everything needed to build a command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandInfo {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Owning group id. Filled from the directory name by the loader.
    #[serde(default)]
    pub group: String,
    /// Name within the group; defaults to `name`.
    #[serde(default)]
    pub member_name: Option<String>,
    pub description: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub guild_only: bool,
    #[serde(default)]
    pub owner_only: bool,
    #[serde(default)]
    pub nsfw: bool,
    /// Permissions the bot needs in the channel.
    #[serde(default)]
    pub client_permissions: Vec<String>,
    /// Permissions the invoking user needs in the channel.
    #[serde(default)]
    pub user_permissions: Vec<String>,
    #[serde(default)]
    pub throttling: Option<Throttling>,
    #[serde(default)]
    pub args: Vec<ArgumentInfo>,
    #[serde(default)]
    pub args_type: ArgsType,
    #[serde(default)]
    pub args_count: Option<usize>,
    #[serde(default)]
    pub args_single_quotes: Option<bool>,
    #[serde(default)]
    pub args_prompt_limit: Option<u32>,
    /// Regex triggers that bypass the prefix parser.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// When false the command is only reachable through `patterns`.
    #[serde(default = "default_true")]
    pub default_handling: bool,
    #[serde(default)]
    pub guarded: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub unknown: bool,
    /// Handler catalog key used by the directory loader.
    #[serde(default)]
    pub handler: Option<String>,
}

impl CommandInfo {
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            description: description.into(),
            default_handling: true,
            ..Default::default()
        }
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn member_name(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = Some(member_name.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    pub fn nsfw(mut self) -> Self {
        self.nsfw = true;
        self
    }

    pub fn client_permissions(mut self, perms: &[Permission]) -> Self {
        self.client_permissions = perms.iter().map(|p| p.name().to_string()).collect();
        self
    }

    pub fn user_permissions(mut self, perms: &[Permission]) -> Self {
        self.user_permissions = perms.iter().map(|p| p.name().to_string()).collect();
        self
    }

    pub fn throttling(mut self, usages: u32, duration: u64) -> Self {
        self.throttling = Some(Throttling::new(usages, duration));
        self
    }

    pub fn arg(mut self, arg: ArgumentInfo) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args_type(mut self, args_type: ArgsType) -> Self {
        self.args_type = args_type;
        self
    }

    pub fn args_count(mut self, count: usize) -> Self {
        self.args_count = Some(count);
        self
    }

    pub fn args_single_quotes(mut self, allow: bool) -> Self {
        self.args_single_quotes = Some(allow);
        self
    }

    pub fn args_prompt_limit(mut self, limit: u32) -> Self {
        self.args_prompt_limit = Some(limit);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn without_default_handling(mut self) -> Self {
        self.default_handling = false;
        self
    }

    pub fn guarded(mut self) -> Self {
        self.guarded = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn unknown(mut self) -> Self {
        self.unknown = true;
        self
    }

    pub fn handler(mut self, key: impl Into<String>) -> Self {
        self.handler = Some(key.into());
        self
    }
}

// ============================================================================
// Descriptor checks
// ============================================================================

fn is_lower_word(s: &str) -> bool {
    !s.is_empty() && s.to_lowercase() == s
}

/// Identity and policy fields that need no registry.
pub(crate) fn validate_identity(info: &CommandInfo) -> Result<(), ValidationError> {
    if info.name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if info.name.to_lowercase() != info.name {
        return Err(ValidationError::NameNotLowercase(info.name.clone()));
    }
    if info.name.chars().any(char::is_whitespace) {
        return Err(ValidationError::NameWhitespace(info.name.clone()));
    }
    for alias in &info.aliases {
        if alias.to_lowercase() != *alias {
            return Err(ValidationError::AliasNotLowercase(alias.clone()));
        }
        if alias.is_empty() || alias.chars().any(char::is_whitespace) {
            return Err(ValidationError::AliasWhitespace(alias.clone()));
        }
    }
    if !is_lower_word(&info.group) {
        return Err(ValidationError::GroupNotLowercase(info.group.clone()));
    }
    if let Some(member) = &info.member_name
        && !is_lower_word(member)
    {
        return Err(ValidationError::MemberNameNotLowercase(member.clone()));
    }
    if info.description.trim().is_empty() {
        return Err(ValidationError::MissingDescription(info.name.clone()));
    }
    if let Some(throttling) = info.throttling {
        if throttling.usages < 1 {
            return Err(ValidationError::ThrottlingUsages);
        }
        if throttling.duration < 1 {
            return Err(ValidationError::ThrottlingDuration);
        }
    }
    if info.args_type == ArgsType::Multiple
        && let Some(count) = info.args_count
        && count < 2
    {
        return Err(ValidationError::ArgsCount(count));
    }
    Ok(())
}

/// Parse permission names against the fixed vocabulary.
pub(crate) fn parse_permissions(names: &[String]) -> Result<Vec<Permission>, ValidationError> {
    names
        .iter()
        .map(|n| {
            n.parse::<Permission>()
                .map_err(|_| ValidationError::UnknownPermission(n.clone()))
        })
        .collect()
}

/// Compile pattern triggers, case-insensitively.
pub(crate) fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ValidationError> {
    patterns
        .iter()
        .map(|p| {
            regex::RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| ValidationError::Pattern {
                    pattern: p.clone(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_descriptor() {
        let info = CommandInfo::new("ban", "mod", "Bans a user.").aliases(["b"]);
        assert!(validate_identity(&info).is_ok());
    }

    #[test]
    fn test_rejects_uppercase_name_and_alias() {
        let info = CommandInfo::new("Ban", "mod", "Bans a user.");
        assert!(matches!(
            validate_identity(&info),
            Err(ValidationError::NameNotLowercase(_))
        ));
        let info = CommandInfo::new("ban", "mod", "Bans a user.").aliases(["B"]);
        assert!(matches!(
            validate_identity(&info),
            Err(ValidationError::AliasNotLowercase(_))
        ));
    }

    #[test]
    fn test_rejects_bad_throttling() {
        let info = CommandInfo::new("ping", "util", "Pong.").throttling(0, 10);
        assert!(matches!(
            validate_identity(&info),
            Err(ValidationError::ThrottlingUsages)
        ));
        let info = CommandInfo::new("ping", "util", "Pong.").throttling(1, 0);
        assert!(matches!(
            validate_identity(&info),
            Err(ValidationError::ThrottlingDuration)
        ));
    }

    #[test]
    fn test_rejects_missing_description() {
        let info = CommandInfo::new("ping", "util", " ");
        assert!(matches!(
            validate_identity(&info),
            Err(ValidationError::MissingDescription(_))
        ));
    }

    #[test]
    fn test_permission_vocabulary() {
        assert_eq!(
            parse_permissions(&["BAN_MEMBERS".into()]).unwrap(),
            vec![Permission::BanMembers]
        );
        assert!(matches!(
            parse_permissions(&["BAN_EVERYONE".into()]),
            Err(ValidationError::UnknownPermission(_))
        ));
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        assert!(matches!(
            compile_patterns(&["(".into()]),
            Err(ValidationError::Pattern { .. })
        ));
    }

    #[test]
    fn test_manifest_deserialises() {
        let info: CommandInfo = toml::from_str(
            r#"
            name = "roll"
            description = "Rolls dice."
            throttling = { usages = 2, duration = 10 }

            [[args]]
            key = "sides"
            type = "integer"
            prompt = "How many sides?"
            min = 2
            default = 6
            "#,
        )
        .unwrap();
        assert!(info.default_handling);
        assert_eq!(info.throttling, Some(Throttling::new(2, 10)));
        assert_eq!(info.args[0].kind.as_deref(), Some("integer"));
        assert_eq!(info.args[0].min, Some(2.0));
    }
}
