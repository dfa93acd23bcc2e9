//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and TOML loading
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup validation collecting every problem found

mod defaults;
mod types;
mod validation;

pub use types::{
    ArgumentsConfig, ClientConfig, Config, ConfigError, DefaultsConfig, LoaderConfig,
    SettingsConfig,
};
pub use validation::{ValidationError as ConfigValidationError, validate};
