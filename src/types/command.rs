//! Registered commands.

use super::{disambiguation, ArgValue, ArgumentType, Lookup, Validation};
use crate::commands::{Argument, Command, CommandContext};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandType;

fn lookup(value: &str, ctx: &CommandContext) -> Lookup<Arc<Command>> {
    let mut found = ctx.framework().registry().find_commands(value, false);
    match found.len() {
        0 => Lookup::NotFound,
        1 => Lookup::Found(found.remove(0)),
        _ => {
            let names: Vec<String> = found.iter().map(|c| c.name.clone()).collect();
            Lookup::Ambiguous(disambiguation(&names, "commands"))
        }
    }
}

#[async_trait]
impl ArgumentType for CommandType {
    fn id(&self) -> &str {
        "command"
    }

    async fn validate(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Validation {
        lookup(value, ctx).validation()
    }

    async fn parse(&self, value: &str, ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        lookup(value, ctx).into_result("commands").map(ArgValue::Command)
    }
}
