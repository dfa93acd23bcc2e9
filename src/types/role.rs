//! Guild roles.

use super::{search, ArgValue, ArgumentType, Lookup, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::{mention, OptionValue, Role, RoleId};

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleType;

fn lookup(value: &str, ctx: &CommandContext) -> Lookup<Role> {
    let Some(guild) = ctx.guild() else {
        return Lookup::NotFound;
    };
    let id: Option<RoleId> = mention::parse_role(value).or_else(|| value.parse().ok());
    if let Some(id) = id {
        return guild.role(id).cloned().map_or(Lookup::NotFound, Lookup::Found);
    }
    search(&guild.roles, value, "roles", |r: &Role| vec![r.name.clone()])
}

#[async_trait]
impl ArgumentType for RoleType {
    fn id(&self) -> &str {
        "role"
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        lookup(value, ctx).validation()
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        lookup(value, ctx).into_result("roles").map(ArgValue::Role)
    }

    fn coerce_option(&self, value: &OptionValue, ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        let OptionValue::Role(id) = value else {
            return None;
        };
        ctx.guild()?.role(*id).cloned().map(ArgValue::Role)
    }
}
