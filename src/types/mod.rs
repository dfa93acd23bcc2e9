//! Argument type plugins.
//!
//! An [`ArgumentType`] validates a raw token and coerces it into an
//! [`ArgValue`]. Types are stateless per call; anything they need about the
//! invocation (the guild cache, the registry, the chat client) comes from the
//! [`CommandContext`].

mod boolean;
mod channel;
mod command;
mod custom_emoji;
mod float;
mod group;
mod integer;
mod member;
mod message;
mod role;
mod string;
mod user;

pub use boolean::BooleanType;
pub use channel::ChannelType;
pub use command::CommandType;
pub use custom_emoji::CustomEmojiType;
pub use float::FloatType;
pub use group::GroupType;
pub use integer::IntegerType;
pub use member::MemberType;
pub use message::MessageType;
pub use role::RoleType;
pub use string::StringType;
pub use user::UserType;

use crate::commands::{Argument, Command, CommandContext, Group};
use async_trait::async_trait;
use commando_model::{Channel, Emoji, Member, Message, OptionValue, Role, User};
use std::fmt;
use std::sync::Arc;

/// Result of a type-level validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid,
    /// Invalid, with a message explaining why.
    Rejected(String),
}

impl From<bool> for Validation {
    fn from(ok: bool) -> Self {
        if ok { Self::Valid } else { Self::Invalid }
    }
}

/// A coerced argument value.
#[derive(Clone)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    User(User),
    Member(Member),
    Role(Role),
    Channel(Channel),
    Message(Message),
    Emoji(Emoji),
    Command(Arc<Command>),
    Group(Arc<Group>),
    /// Values of an infinite argument, in input order.
    List(Vec<ArgValue>),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(u) => Some(u),
            Self::Member(m) => Some(&m.user),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map a structured interaction option to a value without resolution.
    pub fn from_option(value: &OptionValue) -> Self {
        match value {
            OptionValue::String(s) => Self::String(s.clone()),
            OptionValue::Integer(i) => Self::Integer(*i),
            OptionValue::Number(n) => Self::Float(*n),
            OptionValue::Boolean(b) => Self::Boolean(*b),
            other => Self::String(other.to_string()),
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::User(u) => f.debug_tuple("User").field(&u.id).finish(),
            Self::Member(m) => f.debug_tuple("Member").field(&m.user.id).finish(),
            Self::Role(r) => f.debug_tuple("Role").field(&r.id).finish(),
            Self::Channel(c) => f.debug_tuple("Channel").field(&c.id).finish(),
            Self::Message(m) => f.debug_tuple("Message").field(&m.id).finish(),
            Self::Emoji(e) => f.debug_tuple("Emoji").field(&e.id).finish(),
            Self::Command(c) => f.debug_tuple("Command").field(&c.name).finish(),
            Self::Group(g) => f.debug_tuple("Group").field(&g.id).finish(),
            Self::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

/// A pluggable argument kind.
#[async_trait]
pub trait ArgumentType: Send + Sync {
    /// Unique lowercase id, e.g. `"integer"`.
    fn id(&self) -> &str;

    /// Check whether `value` has the right shape for this type.
    async fn validate(&self, value: &str, ctx: &CommandContext, arg: &Argument) -> Validation;

    /// Coerce a validated `value`.
    async fn parse(&self, value: &str, ctx: &CommandContext, arg: &Argument)
    -> Result<ArgValue, String>;

    /// Whether `value` counts as "not supplied".
    fn is_empty(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> bool {
        value.trim().is_empty()
    }

    /// Accept an already-typed interaction option as is.
    ///
    /// `None` means the option does not fit this type directly; its text
    /// form then goes through [`validate`](Self::validate) and
    /// [`parse`](Self::parse) instead.
    fn coerce_option(&self, _value: &OptionValue, _ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        None
    }
}

/// Every built-in type, in registration order.
pub fn builtin() -> Vec<Arc<dyn ArgumentType>> {
    vec![
        Arc::new(StringType),
        Arc::new(IntegerType),
        Arc::new(FloatType),
        Arc::new(BooleanType),
        Arc::new(UserType),
        Arc::new(MemberType),
        Arc::new(RoleType),
        Arc::new(ChannelType::any()),
        Arc::new(ChannelType::text()),
        Arc::new(ChannelType::voice()),
        Arc::new(ChannelType::category()),
        Arc::new(MessageType),
        Arc::new(CustomEmojiType),
        Arc::new(CommandType),
        Arc::new(GroupType),
    ]
}

// ============================================================================
// Name search shared by the reference types
// ============================================================================

/// Result of looking something up by name.
pub(crate) enum Lookup<T> {
    Found(T),
    NotFound,
    Ambiguous(String),
}

impl<T> Lookup<T> {
    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(item) => Lookup::Found(f(item)),
            Self::NotFound => Lookup::NotFound,
            Self::Ambiguous(message) => Lookup::Ambiguous(message),
        }
    }

    pub(crate) fn validation(&self) -> Validation {
        match self {
            Self::Found(_) => Validation::Valid,
            Self::NotFound => Validation::Invalid,
            Self::Ambiguous(message) => Validation::Rejected(message.clone()),
        }
    }

    pub(crate) fn into_result(self, label: &str) -> Result<T, String> {
        match self {
            Self::Found(item) => Ok(item),
            Self::NotFound => Err(format!("No matching {} found.", label)),
            Self::Ambiguous(message) => Err(message),
        }
    }
}

/// Most candidates listed in a disambiguation reply.
const MAX_LISTED: usize = 15;

/// "Multiple X found" reply listing candidate names.
pub(crate) fn disambiguation(names: &[String], label: &str) -> String {
    if names.len() > MAX_LISTED {
        return format!("Multiple {} found. Please be more specific.", label);
    }
    let list = names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Multiple {} found, please be more specific: {}", label, list)
}

/// Case-insensitive name search.
///
/// A single partial match wins outright. Among several, a single exact
/// match wins. Anything else is ambiguous.
pub(crate) fn search<T: Clone>(
    items: &[T],
    query: &str,
    label: &str,
    names: impl Fn(&T) -> Vec<String>,
) -> Lookup<T> {
    let query = query.to_lowercase();
    let partial: Vec<&T> = items
        .iter()
        .filter(|item| names(*item).iter().any(|n| n.to_lowercase().contains(&query)))
        .collect();
    match partial.as_slice() {
        [] => return Lookup::NotFound,
        [one] => return Lookup::Found((*one).clone()),
        _ => {}
    }

    let exact: Vec<&T> = partial
        .iter()
        .copied()
        .filter(|item| names(*item).iter().any(|n| n.to_lowercase() == query))
        .collect();
    if let [one] = exact.as_slice() {
        return Lookup::Found((*one).clone());
    }

    let pool = if exact.is_empty() { &partial } else { &exact };
    let listed: Vec<String> = pool
        .iter()
        .filter_map(|item| names(*item).into_iter().next())
        .collect();
    Lookup::Ambiguous(disambiguation(&listed, label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(s: &&str) -> Vec<String> {
        vec![s.to_string()]
    }

    #[test]
    fn test_search_single_partial_wins() {
        let items = ["general", "random"];
        assert!(matches!(search(&items, "GEN", "channels", names), Lookup::Found("general")));
    }

    #[test]
    fn test_search_exact_breaks_tie() {
        let items = ["mod", "mods", "modlog"];
        assert!(matches!(search(&items, "mod", "roles", names), Lookup::Found("mod")));
    }

    #[test]
    fn test_search_ambiguous_lists_candidates() {
        let items = ["alpha", "alphabet"];
        match search(&items, "alp", "roles", names) {
            Lookup::Ambiguous(msg) => assert_eq!(
                msg,
                "Multiple roles found, please be more specific: \"alpha\", \"alphabet\""
            ),
            _ => panic!("expected ambiguity"),
        }
    }

    #[test]
    fn test_search_not_found() {
        let items = ["alpha"];
        assert!(matches!(search(&items, "zeta", "roles", names), Lookup::NotFound));
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let types = builtin();
        let mut ids: Vec<&str> = types.iter().map(|t| t.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), types.len());
    }
}
