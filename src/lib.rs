//! commando - command framework for chat bots.
//!
//! Commands, groups and argument types live in a [`Registry`]. Inbound
//! messages and interactions go through a [`Framework`], which matches
//! them to commands (by prefix, mention, DM or regex pattern), runs the
//! guard chain and throttling, collects arguments (prompting the user
//! when some are missing), and finally invokes the command's handler.
//!
//! Per-guild prefixes and enable flags survive restarts through a
//! [`SettingProvider`](settings::SettingProvider); [`SqliteProvider`]
//! keeps them in SQLite.
//!
//! The chat platform itself stays outside: a host implements
//! [`ChatClient`] and builds [`model`] values from its gateway.

pub mod builtin;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod framework;
pub mod platform;
pub mod registry;
pub mod settings;
pub mod types;

pub use commando_model as model;

pub use commands::{
    ArgumentInfo, ArgumentValues, Command, CommandContext, CommandHandler, CommandInfo,
    CommandSource, Group, GroupInfo,
};
pub use config::Config;
pub use dispatcher::{DispatchOutcome, Inhibition, Inhibitor};
pub use error::{CommandError, CommandResult, RegistrationError, StateError, ValidationError};
pub use events::{EventBus, FrameworkEvent};
pub use framework::{Framework, Owners};
pub use platform::{ChatClient, ClientError, ResponseTarget};
pub use registry::{HandlerCatalog, Registry};
pub use settings::{Scope, SettingProvider, SettingsError, SqliteProvider};
pub use types::{ArgValue, ArgumentType, Validation};
