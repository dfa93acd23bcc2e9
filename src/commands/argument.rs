//! A single argument definition and its prompting state machine.

use crate::commands::CommandContext;
use crate::error::ValidationError;
use crate::registry::Registry;
use crate::types::{ArgValue, ArgumentType, Validation};
use commando_model::{Message, OptionValue};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-argument validation layered after the type's own check.
#[derive(Clone)]
pub struct CustomValidator(pub Arc<dyn Fn(&str, &Argument) -> Validation + Send + Sync>);

/// Per-argument transform applied to the type's parsed value.
#[derive(Clone)]
pub struct CustomParser(pub Arc<dyn Fn(ArgValue, &Argument) -> Result<ArgValue, String> + Send + Sync>);

impl fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomValidator")
    }
}

impl fmt::Debug for CustomParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomParser")
    }
}

/// Scalar default as written in a manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ArgDefault {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<ArgDefault> for ArgValue {
    fn from(value: ArgDefault) -> Self {
        match value {
            ArgDefault::Boolean(b) => ArgValue::Boolean(b),
            ArgDefault::Integer(i) => ArgValue::Integer(i),
            ArgDefault::Float(f) => ArgValue::Float(f),
            ArgDefault::String(s) => ArgValue::String(s),
        }
    }
}

/// Declarative argument definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArgumentInfo {
    /// Field name in the collected values.
    pub key: String,
    /// Display name; defaults to the key.
    #[serde(default)]
    pub label: Option<String>,
    /// Question asked when the value is missing.
    pub prompt: String,
    /// Reply used instead of the generic "invalid" message.
    #[serde(default)]
    pub error: Option<String>,
    /// Type id, or several joined with `|`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Makes the argument optional.
    #[serde(default)]
    pub default: Option<ArgDefault>,
    #[serde(default)]
    pub one_of: Option<Vec<String>>,
    #[serde(default)]
    pub infinite: bool,
    /// Seconds to wait for each answer.
    #[serde(default)]
    pub wait: Option<u64>,
    #[serde(skip)]
    pub validator: Option<CustomValidator>,
    #[serde(skip)]
    pub parser: Option<CustomParser>,
    #[serde(skip)]
    pub default_value: Option<ArgValue>,
}

impl ArgumentInfo {
    pub fn new(key: impl Into<String>, kind: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: Some(kind.into()),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Default used when the value is not supplied.
    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    pub fn wait(mut self, secs: u64) -> Self {
        self.wait = Some(secs);
        self
    }

    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Argument) -> Validation + Send + Sync + 'static,
    {
        self.validator = Some(CustomValidator(Arc::new(f)));
        self
    }

    pub fn parser<F>(mut self, f: F) -> Self
    where
        F: Fn(ArgValue, &Argument) -> Result<ArgValue, String> + Send + Sync + 'static,
    {
        self.parser = Some(CustomParser(Arc::new(f)));
        self
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Integer(i)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Boolean(b)
    }
}

/// Which check rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The argument type did not accept the value.
    Type,
    /// The value is not one of the allowed options.
    OneOf,
    /// The value is outside `min`/`max`.
    Range,
    /// The per-argument validator or parser refused it.
    Custom,
}

/// A value that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub message: Option<String>,
}

impl Rejection {
    fn new(kind: RejectionKind, message: Option<String>) -> Self {
        Self { kind, message }
    }

    fn from_validation(kind: RejectionKind, validation: Validation) -> Option<Self> {
        match validation {
            Validation::Valid => None,
            Validation::Invalid => Some(Self::new(kind, None)),
            Validation::Rejected(message) => Some(Self::new(kind, Some(message))),
        }
    }
}

/// Why prompting stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user answered `cancel`.
    User,
    /// No answer arrived in time.
    Time,
}

/// How a single argument failed to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum ObtainFailure {
    Cancelled(CancelReason),
    PromptLimit,
    Rejected(Rejection),
    Missing,
}

/// Outcome of obtaining one argument.
#[derive(Debug, Clone, Default)]
pub struct Obtained {
    pub result: Option<ArgValue>,
    pub failure: Option<ObtainFailure>,
    pub prompts: Vec<String>,
    pub answers: Vec<Message>,
}

impl Obtained {
    fn value(value: ArgValue, prompts: Vec<String>, answers: Vec<Message>) -> Self {
        Self {
            result: Some(value),
            failure: None,
            prompts,
            answers,
        }
    }

    fn failed(failure: ObtainFailure, prompts: Vec<String>, answers: Vec<Message>) -> Self {
        Self {
            result: None,
            failure: Some(failure),
            prompts,
            answers,
        }
    }
}

/// Raw input for one argument.
#[derive(Debug, Clone, Copy)]
pub enum RawInput<'a> {
    One(Option<&'a str>),
    Many(&'a [String]),
}

/// A validated argument definition.
pub struct Argument {
    pub key: String,
    pub label: String,
    pub prompt: String,
    pub error: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default: Option<ArgValue>,
    /// Allowed values, lowercased.
    pub one_of: Option<Vec<String>>,
    pub infinite: bool,
    pub wait: Duration,
    types: Vec<Arc<dyn ArgumentType>>,
    validator: Option<CustomValidator>,
    parser: Option<CustomParser>,
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("key", &self.key)
            .field("types", &self.type_ids())
            .field("default", &self.default)
            .field("infinite", &self.infinite)
            .finish()
    }
}

impl Argument {
    /// Validate `info` against the registered types.
    pub fn new(registry: &Registry, info: ArgumentInfo, default_wait: u64) -> Result<Self, ValidationError> {
        if info.key.trim().is_empty() {
            return Err(ValidationError::EmptyArgumentKey);
        }
        if info.prompt.trim().is_empty() {
            return Err(ValidationError::MissingPrompt(info.key));
        }

        let mut types = Vec::new();
        if let Some(kind) = &info.kind {
            for id in kind.split('|').map(|id| id.trim().to_lowercase()) {
                match registry.resolve_type(&id) {
                    Some(ty) => types.push(ty),
                    None => {
                        return Err(ValidationError::UnknownType {
                            key: info.key,
                            kind: id,
                        });
                    }
                }
            }
        } else if info.validator.is_none() || info.parser.is_none() {
            return Err(ValidationError::MissingType(info.key));
        }

        if let (Some(min), Some(max)) = (info.min, info.max)
            && min > max
        {
            return Err(ValidationError::InvertedBounds(info.key));
        }

        let wait = info.wait.unwrap_or(default_wait);
        if wait == 0 {
            return Err(ValidationError::WaitTooShort(info.key));
        }

        let default = info.default_value.or_else(|| info.default.map(ArgValue::from));
        Ok(Self {
            label: info.label.unwrap_or_else(|| info.key.clone()),
            key: info.key,
            prompt: info.prompt,
            error: info.error,
            min: info.min,
            max: info.max,
            default,
            one_of: info
                .one_of
                .map(|v| v.into_iter().map(|s| s.to_lowercase()).collect()),
            infinite: info.infinite,
            wait: Duration::from_secs(wait),
            types,
            validator: info.validator,
            parser: info.parser,
        })
    }

    /// Ids of the types tried, in order.
    pub fn type_ids(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.id()).collect()
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    /// Whether `value` counts as not supplied.
    pub fn is_empty(&self, value: &str, ctx: &CommandContext) -> bool {
        if self.types.is_empty() {
            return value.trim().is_empty();
        }
        self.types.iter().any(|t| t.is_empty(value, ctx, self))
    }

    /// Validate and coerce `value`, trying each type in order.
    ///
    /// The first type to accept wins. Otherwise the last rejection is
    /// returned.
    pub async fn resolve(&self, value: &str, ctx: &CommandContext) -> Result<ArgValue, Rejection> {
        if self.types.is_empty() {
            return self.resolve_with(None, value, ctx).await;
        }
        let mut last = Rejection::new(RejectionKind::Type, None);
        for ty in &self.types {
            match self.resolve_with(Some(ty.as_ref()), value, ctx).await {
                Ok(parsed) => return Ok(parsed),
                Err(rejection) => last = rejection,
            }
        }
        Err(last)
    }

    /// Resolve a typed interaction option.
    ///
    /// Types that accept the option directly skip text validation. Without
    /// such a type, or with a custom validator, the option's text form is
    /// resolved like a typed-in value.
    pub async fn resolve_option(&self, option: &OptionValue, ctx: &CommandContext) -> Result<ArgValue, Rejection> {
        if self.validator.is_none()
            && let Some(value) = self.types.iter().find_map(|ty| ty.coerce_option(option, ctx, self))
        {
            self.check_one_of(&option.to_string())?;
            return self.finish(value);
        }
        self.resolve(&option.to_string(), ctx).await
    }

    async fn resolve_with(
        &self,
        ty: Option<&dyn ArgumentType>,
        value: &str,
        ctx: &CommandContext,
    ) -> Result<ArgValue, Rejection> {
        if let Some(ty) = ty
            && let Some(r) =
                Rejection::from_validation(RejectionKind::Type, ty.validate(value, ctx, self).await)
        {
            return Err(r);
        }
        if let Some(validator) = &self.validator
            && let Some(r) = Rejection::from_validation(RejectionKind::Custom, (validator.0)(value, self))
        {
            return Err(r);
        }
        self.check_one_of(value)?;

        let parsed = match ty {
            Some(ty) => ty
                .parse(value, ctx, self)
                .await
                .map_err(|m| Rejection::new(RejectionKind::Type, Some(m)))?,
            None => ArgValue::String(value.to_string()),
        };
        self.finish(parsed)
    }

    fn check_one_of(&self, value: &str) -> Result<(), Rejection> {
        match &self.one_of {
            Some(options) if !options.contains(&value.to_lowercase()) => Err(Rejection::new(
                RejectionKind::OneOf,
                Some(format!(
                    "Please enter one of the following options: {}",
                    options.join(" | ")
                )),
            )),
            _ => Ok(()),
        }
    }

    /// Run the custom parser, then the bounds check.
    fn finish(&self, mut parsed: ArgValue) -> Result<ArgValue, Rejection> {
        if let Some(parser) = &self.parser {
            parsed = (parser.0)(parsed, self).map_err(|m| Rejection::new(RejectionKind::Custom, Some(m)))?;
        }
        self.check_bounds(&parsed)?;
        Ok(parsed)
    }

    fn check_bounds(&self, value: &ArgValue) -> Result<(), Rejection> {
        let (measured, numeric) = match value {
            ArgValue::Integer(i) => (*i as f64, true),
            ArgValue::Float(f) => (*f, true),
            ArgValue::String(s) => (s.chars().count() as f64, false),
            _ => return Ok(()),
        };
        let out_of_range = |message: String| Err(Rejection::new(RejectionKind::Range, Some(message)));
        if let Some(min) = self.min
            && measured < min
        {
            return out_of_range(if numeric {
                format!("Please enter a number above or exactly {}.", min)
            } else {
                format!(
                    "Please keep the {} above or exactly {} characters.",
                    self.label, min
                )
            });
        }
        if let Some(max) = self.max
            && measured > max
        {
            return out_of_range(if numeric {
                format!("Please enter a number below or exactly {}.", max)
            } else {
                format!(
                    "Please keep the {} below or exactly {} characters.",
                    self.label, max
                )
            });
        }
        Ok(())
    }

    /// Text shown when a value was supplied but rejected.
    pub fn rejection_text(&self, rejection: &Rejection) -> String {
        rejection
            .message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| format!("You provided an invalid {}. Please try again.", self.label))
    }

    fn prompt_text(&self, question: &str, allow_finish: bool) -> String {
        let finish = if allow_finish {
            ", or `finish` to finish entry up to this point"
        } else {
            ""
        };
        format!(
            "{}\nRespond with `cancel` to cancel the command{}. The command will automatically be cancelled in {} seconds.",
            question,
            finish,
            self.wait.as_secs()
        )
    }

    /// Obtain this argument's value.
    ///
    /// With `conversational` set the user is prompted for missing or
    /// invalid values, at most `prompt_limit` times. Otherwise the first
    /// failure is final.
    pub async fn obtain(
        &self,
        ctx: &CommandContext,
        input: RawInput<'_>,
        conversational: bool,
        prompt_limit: Option<u32>,
    ) -> Obtained {
        match input {
            RawInput::Many(values) if self.infinite => {
                self.obtain_infinite(ctx, values, conversational, prompt_limit).await
            }
            RawInput::Many(values) => {
                let first = values.first().map(String::as_str);
                self.obtain_one(ctx, first, conversational, prompt_limit).await
            }
            RawInput::One(value) if self.infinite => {
                let values: Vec<String> = value.map(str::to_string).into_iter().collect();
                self.obtain_infinite(ctx, &values, conversational, prompt_limit).await
            }
            RawInput::One(value) => self.obtain_one(ctx, value, conversational, prompt_limit).await,
        }
    }

    async fn obtain_one(
        &self,
        ctx: &CommandContext,
        value: Option<&str>,
        conversational: bool,
        prompt_limit: Option<u32>,
    ) -> Obtained {
        let mut current = value.unwrap_or("").to_string();
        let mut empty = self.is_empty(&current, ctx);
        if empty && let Some(default) = &self.default {
            return Obtained::value(default.clone(), Vec::new(), Vec::new());
        }

        let mut prompts = Vec::new();
        let mut answers = Vec::new();
        loop {
            let rejection = if empty {
                None
            } else {
                match self.resolve(&current, ctx).await {
                    Ok(parsed) => return Obtained::value(parsed, prompts, answers),
                    Err(rejection) => Some(rejection),
                }
            };

            if !conversational {
                let failure = match rejection {
                    Some(r) => ObtainFailure::Rejected(r),
                    None => ObtainFailure::Missing,
                };
                return Obtained::failed(failure, prompts, answers);
            }
            if prompt_limit.is_some_and(|limit| prompts.len() as u32 >= limit) {
                return Obtained::failed(ObtainFailure::PromptLimit, prompts, answers);
            }

            let question = match &rejection {
                None => self.prompt.clone(),
                Some(r) => self.rejection_text(r),
            };
            let text = self.prompt_text(&question, false);
            if let Err(e) = ctx.reply(&text).await {
                tracing::warn!(error = %e, "failed to send argument prompt");
            }
            prompts.push(text);

            let Some(answer) = ctx.await_reply(self.wait).await else {
                return Obtained::failed(ObtainFailure::Cancelled(CancelReason::Time), prompts, answers);
            };
            current = answer.content.clone();
            answers.push(answer);
            if current.trim().eq_ignore_ascii_case("cancel") {
                return Obtained::failed(ObtainFailure::Cancelled(CancelReason::User), prompts, answers);
            }
            empty = self.is_empty(&current, ctx);
        }
    }

    async fn obtain_infinite(
        &self,
        ctx: &CommandContext,
        values: &[String],
        conversational: bool,
        prompt_limit: Option<u32>,
    ) -> Obtained {
        if values.is_empty()
            && let Some(default) = &self.default
        {
            return Obtained::value(default.clone(), Vec::new(), Vec::new());
        }

        let mut results = Vec::new();
        let mut prompts = Vec::new();
        let mut answers = Vec::new();
        let mut pending = values.iter().cloned();
        let mut current = pending.next();

        loop {
            let rejection = match &current {
                Some(value) if !self.is_empty(value, ctx) => match self.resolve(value, ctx).await {
                    Ok(parsed) => {
                        results.push(parsed);
                        current = pending.next();
                        if current.is_none() && !values.is_empty() {
                            return Obtained::value(ArgValue::List(results), prompts, answers);
                        }
                        continue;
                    }
                    Err(rejection) => Some(rejection),
                },
                _ => None,
            };

            if !conversational {
                let failure = match rejection {
                    Some(r) => ObtainFailure::Rejected(r),
                    None if results.is_empty() => ObtainFailure::Missing,
                    None => return Obtained::value(ArgValue::List(results), prompts, answers),
                };
                return Obtained::failed(failure, prompts, answers);
            }
            if prompt_limit.is_some_and(|limit| prompts.len() as u32 >= limit) {
                return Obtained::failed(ObtainFailure::PromptLimit, prompts, answers);
            }

            let question = match &rejection {
                None => self.prompt.clone(),
                Some(r) => self.rejection_text(r),
            };
            let text = self.prompt_text(&question, true);
            if let Err(e) = ctx.reply(&text).await {
                tracing::warn!(error = %e, "failed to send argument prompt");
            }
            prompts.push(text);

            let Some(answer) = ctx.await_reply(self.wait).await else {
                return Obtained::failed(ObtainFailure::Cancelled(CancelReason::Time), prompts, answers);
            };
            let content = answer.content.trim().to_string();
            answers.push(answer);
            if content.eq_ignore_ascii_case("finish") {
                if !results.is_empty() {
                    return Obtained::value(ArgValue::List(results), prompts, answers);
                }
                if let Some(default) = &self.default {
                    return Obtained::value(default.clone(), prompts, answers);
                }
                return Obtained::failed(ObtainFailure::Cancelled(CancelReason::User), prompts, answers);
            }
            if content.eq_ignore_ascii_case("cancel") {
                return Obtained::failed(ObtainFailure::Cancelled(CancelReason::User), prompts, answers);
            }
            current = Some(content);
        }
    }
}
