//! Registered command groups.

use super::{disambiguation, ArgValue, ArgumentType, Lookup, Validation};
use crate::commands::{Argument, CommandContext, Group};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupType;

fn lookup(value: &str, ctx: &CommandContext) -> Lookup<Arc<Group>> {
    let mut found = ctx.framework().registry().find_groups(value, false);
    match found.len() {
        0 => Lookup::NotFound,
        1 => Lookup::Found(found.remove(0)),
        _ => {
            let names: Vec<String> = found.iter().map(|g| g.name.clone()).collect();
            Lookup::Ambiguous(disambiguation(&names, "groups"))
        }
    }
}

#[async_trait]
impl ArgumentType for GroupType {
    fn id(&self) -> &str {
        "group"
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        lookup(value, ctx).validation()
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        lookup(value, ctx).into_result("groups").map(ArgValue::Group)
    }
}
