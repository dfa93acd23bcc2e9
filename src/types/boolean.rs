//! Yes/no answers.

use super::{ArgValue, ArgumentType, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::OptionValue;

const TRUTHY: &[&str] = &["true", "t", "yes", "y", "on", "enable", "enabled", "1", "+"];
const FALSY: &[&str] = &["false", "f", "no", "n", "off", "disable", "disabled", "0", "-"];

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

/// Interpret a yes/no word.
pub fn parse_bool(value: &str) -> Option<bool> {
    let lc = value.trim().to_lowercase();
    if TRUTHY.contains(&lc.as_str()) {
        Some(true)
    } else if FALSY.contains(&lc.as_str()) {
        Some(false)
    } else {
        None
    }
}

#[async_trait]
impl ArgumentType for BooleanType {
    fn id(&self) -> &str {
        "boolean"
    }

    async fn validate(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Validation {
        Validation::from(parse_bool(value).is_some())
    }

    async fn parse(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        parse_bool(value)
            .map(ArgValue::Boolean)
            .ok_or_else(|| "Unknown boolean value.".to_string())
    }

    fn coerce_option(&self, value: &OptionValue, _ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        match value {
            OptionValue::Boolean(b) => Some(ArgValue::Boolean(*b)),
            _ => None,
        }
    }
}
