//! Finite decimal numbers.

use super::{ArgValue, ArgumentType, Validation};
use crate::commands::{Argument, CommandContext};
use async_trait::async_trait;
use commando_model::OptionValue;

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

fn parse_finite(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

#[async_trait]
impl ArgumentType for FloatType {
    fn id(&self) -> &str {
        "float"
    }

    async fn validate(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Validation {
        Validation::from(parse_finite(value).is_some())
    }

    async fn parse(&self, value: &str, _ctx: &CommandContext, _arg: &Argument) -> Result<ArgValue, String> {
        parse_finite(value)
            .map(ArgValue::Float)
            .ok_or_else(|| format!("{:?} is not a number.", value))
    }

    fn coerce_option(&self, value: &OptionValue, _ctx: &CommandContext, _arg: &Argument) -> Option<ArgValue> {
        match value {
            OptionValue::Number(n) if n.is_finite() => Some(ArgValue::Float(*n)),
            OptionValue::Integer(i) => Some(ArgValue::Float(*i as f64)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(parse_finite(" 2.5 "), Some(2.5));
        assert_eq!(parse_finite("NaN"), None);
        assert_eq!(parse_finite("inf"), None);
        assert_eq!(parse_finite("abc"), None);
    }
}
