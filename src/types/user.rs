//! Users, resolved by mention, id or name.

use super::{search, ArgValue, ArgumentType, Lookup, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::{mention, Member, OptionValue, User, UserId};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct UserType;

pub(crate) fn member_names(member: &Member) -> Vec<String> {
    let mut names = vec![member.user.tag(), member.user.username.clone()];
    if let Some(nick) = &member.nickname {
        names.push(nick.clone());
    }
    names
}

pub(crate) fn parse_user_ref(value: &str) -> Option<UserId> {
    mention::parse_user(value).or_else(|| value.parse().ok())
}

async fn lookup(value: &str, ctx: &CommandContext) -> Lookup<User> {
    if let Some(id) = parse_user_ref(value) {
        if let Some(member) = ctx.guild().and_then(|g| g.member(id)) {
            return Lookup::Found(member.user.clone());
        }
        if let Some(user) = ctx
            .message()
            .and_then(|m| m.mentions.iter().find(|u| u.id == id))
        {
            return Lookup::Found(user.clone());
        }
        return match ctx.framework().client().fetch_user(id).await {
            Ok(Some(user)) => Lookup::Found(user),
            Ok(None) => Lookup::NotFound,
            Err(e) => {
                debug!(user = %id, error = %e, "user lookup failed");
                Lookup::NotFound
            }
        };
    }

    match ctx.guild() {
        Some(guild) => search(&guild.members, value, "users", member_names).map(|m| m.user),
        None => Lookup::NotFound,
    }
}

#[async_trait]
impl ArgumentType for UserType {
    fn id(&self) -> &str {
        "user"
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        lookup(value, ctx).await.validation()
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        lookup(value, ctx).await.into_result("users").map(ArgValue::User)
    }

    /// Cached guild members only; anyone else is fetched through the text path.
    fn coerce_option(&self, value: &OptionValue, ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        let OptionValue::User(id) = value else {
            return None;
        };
        let member = ctx.guild()?.member(*id)?;
        Some(ArgValue::User(member.user.clone()))
    }
}
