//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("client.prefix must not contain whitespace, got {0:?}")]
    PrefixWhitespace(String),
    #[error("arguments.wait_secs must be at least 1")]
    ZeroWait,
    #[error("arguments.prompt_limit must be at least 1 when set")]
    ZeroPromptLimit,
    #[error("settings.path parent directory does not exist: {0}")]
    SettingsPathInvalid(String),
    #[error("loader.commands_dir does not exist: {0}")]
    CommandsDirNotFound(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.client.prefix.chars().any(char::is_whitespace) {
        errors.push(ValidationError::PrefixWhitespace(config.client.prefix.clone()));
    }

    if config.arguments.wait_secs == 0 {
        errors.push(ValidationError::ZeroWait);
    }
    if config.arguments.prompt_limit == Some(0) {
        errors.push(ValidationError::ZeroPromptLimit);
    }

    if let Some(ref settings) = config.settings
        && settings.path != ":memory:"
    {
        let path = Path::new(&settings.path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::SettingsPathInvalid(settings.path.clone()));
        }
    }

    if let Some(ref dir) = config.loader.commands_dir
        && !dir.exists()
    {
        errors.push(ValidationError::CommandsDirNotFound(dir.display().to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
