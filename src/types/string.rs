//! Free text.

use super::{ArgValue, ArgumentType, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::OptionValue;

/// Any non-empty text. Length bounds and `one_of` are enforced by the argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

#[async_trait]
impl ArgumentType for StringType {
    fn id(&self) -> &str {
        "string"
    }

    async fn validate(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Validation {
        Validation::from(!value.is_empty())
    }

    async fn parse(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        Ok(ArgValue::String(value.to_string()))
    }

    fn coerce_option(&self, value: &OptionValue, _ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        match value {
            OptionValue::String(s) if !s.is_empty() => Some(ArgValue::String(s.clone())),
            _ => None,
        }
    }
}
