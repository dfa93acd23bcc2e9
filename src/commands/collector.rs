//! Ordered argument collection.
//!
//! The collector walks a command's argument schema left to right, feeding
//! each definition the next raw token (or, for an infinite argument, every
//! remaining token). In conversational mode a missing or rejected value
//! turns into a prompt answered in the same channel.

use super::argument::{
    Argument, ArgumentInfo, CancelReason, ObtainFailure, Obtained, RawInput, Rejection,
};
use crate::commands::CommandContext;
use crate::error::ValidationError;
use crate::registry::Registry;
use crate::types::ArgValue;
use commando_model::{InteractionOption, Message};
use std::collections::HashSet;

/// Collected values in schema order, keyed by argument key.
#[derive(Debug, Clone, Default)]
pub struct ArgumentValues {
    entries: Vec<(String, ArgValue)>,
}

impl ArgumentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: ArgValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ArgValue::as_str)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ArgValue::as_integer)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ArgValue::as_float)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ArgValue::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How the collector may recover from missing or invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Prompt the user, at most `prompt_limit` times per argument.
    Conversational { prompt_limit: Option<u32> },
    /// Fail on the first missing or rejected value.
    Strict,
}

/// Why collection stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    Cancelled(CancelReason),
    PromptLimit,
    Rejected(Rejection),
    Missing,
}

impl From<ObtainFailure> for FailureReason {
    fn from(failure: ObtainFailure) -> Self {
        match failure {
            ObtainFailure::Cancelled(reason) => Self::Cancelled(reason),
            ObtainFailure::PromptLimit => Self::PromptLimit,
            ObtainFailure::Rejected(rejection) => Self::Rejected(rejection),
            ObtainFailure::Missing => Self::Missing,
        }
    }
}

/// Successful collection.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub values: ArgumentValues,
    pub prompts: Vec<String>,
    pub answers: Vec<Message>,
}

/// Failed collection, identifying the argument that stopped it.
#[derive(Debug, Clone)]
pub struct CollectionFailure {
    pub key: String,
    pub label: String,
    pub reason: FailureReason,
    pub prompts: Vec<String>,
    pub answers: Vec<Message>,
}

impl CollectionFailure {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.reason, FailureReason::Cancelled(_))
    }
}

/// A validated argument schema.
#[derive(Debug)]
pub struct ArgumentCollector {
    args: Vec<Argument>,
    prompt_limit: Option<u32>,
}

impl ArgumentCollector {
    /// Build a collector, checking the schema rules.
    ///
    /// Only the last argument may be infinite, keys must be unique, and a
    /// required argument may not follow an optional one.
    pub fn new(
        registry: &Registry,
        infos: Vec<ArgumentInfo>,
        prompt_limit: Option<u32>,
        default_wait: u64,
    ) -> Result<Self, ValidationError> {
        let total = infos.len();
        let mut keys = HashSet::new();
        let mut seen_optional = false;
        let mut args = Vec::with_capacity(total);

        for (i, info) in infos.into_iter().enumerate() {
            if !keys.insert(info.key.clone()) {
                return Err(ValidationError::DuplicateArgumentKey(info.key));
            }
            if info.infinite && i + 1 != total {
                return Err(ValidationError::InfiniteNotLast(info.key));
            }
            let arg = Argument::new(registry, info, default_wait)?;
            if arg.is_optional() {
                seen_optional = true;
            } else if seen_optional {
                return Err(ValidationError::RequiredAfterOptional(arg.key));
            }
            args.push(arg);
        }

        Ok(Self { args, prompt_limit })
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    pub fn prompt_limit(&self) -> Option<u32> {
        self.prompt_limit
    }

    /// Whether the last argument consumes every remaining token.
    pub fn has_infinite(&self) -> bool {
        self.args.last().is_some_and(|a| a.infinite)
    }

    /// Collect every argument from `provided` tokens.
    pub async fn obtain(
        &self,
        ctx: &CommandContext,
        provided: &[String],
        mode: CollectMode,
    ) -> Result<Collected, CollectionFailure> {
        let (conversational, prompt_limit) = match mode {
            CollectMode::Conversational { prompt_limit } => {
                (true, prompt_limit.or(self.prompt_limit))
            }
            CollectMode::Strict => (false, None),
        };
        let _guard = conversational.then(|| ctx.begin_awaiting());

        let mut collected = Collected::default();
        for (i, arg) in self.args.iter().enumerate() {
            let input = if arg.infinite {
                RawInput::Many(provided.get(i..).unwrap_or(&[]))
            } else {
                RawInput::One(provided.get(i).map(String::as_str))
            };
            let Obtained {
                result,
                failure,
                prompts,
                answers,
            } = arg.obtain(ctx, input, conversational, prompt_limit).await;
            collected.prompts.extend(prompts);
            collected.answers.extend(answers);

            match result {
                Some(value) => collected.values.insert(arg.key.clone(), value),
                None => {
                    return Err(CollectionFailure {
                        key: arg.key.clone(),
                        label: arg.label.clone(),
                        reason: failure.map_or(FailureReason::Missing, FailureReason::from),
                        prompts: collected.prompts,
                        answers: collected.answers,
                    });
                }
            }
        }
        Ok(collected)
    }

    /// Map structured interaction options onto the schema.
    ///
    /// Options arrive already typed. A type that accepts the typed value
    /// takes it as is; anything else is resolved from its text form.
    pub async fn collect_structured(
        &self,
        ctx: &CommandContext,
        options: &[InteractionOption],
    ) -> Result<ArgumentValues, CollectionFailure> {
        let mut values = ArgumentValues::new();
        for arg in &self.args {
            let option = options.iter().find(|o| o.name.eq_ignore_ascii_case(&arg.key));
            let value = match option {
                Some(option) => {
                    match arg.resolve_option(&option.value, ctx).await {
                        Ok(value) => value,
                        Err(rejection) => {
                            return Err(CollectionFailure {
                                key: arg.key.clone(),
                                label: arg.label.clone(),
                                reason: FailureReason::Rejected(rejection),
                                prompts: Vec::new(),
                                answers: Vec::new(),
                            });
                        }
                    }
                }
                None => match &arg.default {
                    Some(default) => default.clone(),
                    None => {
                        return Err(CollectionFailure {
                            key: arg.key.clone(),
                            label: arg.label.clone(),
                            reason: FailureReason::Missing,
                            prompts: Vec::new(),
                            answers: Vec::new(),
                        });
                    }
                },
            };
            let value = match (arg.infinite, value) {
                (true, ArgValue::List(items)) => ArgValue::List(items),
                (true, single) => ArgValue::List(vec![single]),
                (false, value) => value,
            };
            values.insert(arg.key.clone(), value);
        }
        Ok(values)
    }
}
