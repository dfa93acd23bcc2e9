//! Whole numbers.

use super::{ArgValue, ArgumentType, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::OptionValue;

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

#[async_trait]
impl ArgumentType for IntegerType {
    fn id(&self) -> &str {
        "integer"
    }

    async fn validate(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Validation {
        Validation::from(value.trim().parse::<i64>().is_ok())
    }

    async fn parse(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        value
            .trim()
            .parse()
            .map(ArgValue::Integer)
            .map_err(|_| format!("{:?} is not a whole number.", value))
    }

    fn coerce_option(&self, value: &OptionValue, _ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        match value {
            OptionValue::Integer(i) => Some(ArgValue::Integer(*i)),
            _ => None,
        }
    }
}
