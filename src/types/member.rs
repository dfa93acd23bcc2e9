//! Guild members.

use super::user::{member_names, parse_user_ref};
use super::{search, ArgValue, ArgumentType, Lookup, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::{Member, OptionValue};

/// A member of the guild the command runs in. Never matches in DMs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberType;

fn lookup(value: &str, ctx: &CommandContext) -> Lookup<Member> {
    let Some(guild) = ctx.guild() else {
        return Lookup::NotFound;
    };
    if let Some(id) = parse_user_ref(value) {
        return guild
            .member(id)
            .cloned()
            .map_or(Lookup::NotFound, Lookup::Found);
    }
    search(&guild.members, value, "members", member_names)
}

#[async_trait]
impl ArgumentType for MemberType {
    fn id(&self) -> &str {
        "member"
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        lookup(value, ctx).validation()
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        lookup(value, ctx).into_result("members").map(ArgValue::Member)
    }

    fn coerce_option(&self, value: &OptionValue, ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        let OptionValue::User(id) = value else {
            return None;
        };
        ctx.guild()?.member(*id).cloned().map(ArgValue::Member)
    }
}
