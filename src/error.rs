//! Unified error handling for commando.
//!
//! Registration and validation failures are fatal to the call that caused
//! them and surface to the host at startup. Command failures are caught at
//! the dispatch boundary and turned into replies.

use crate::platform::ClientError;
use crate::settings::SettingsError;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Validation Errors (descriptor construction)
// ============================================================================

/// A command, group or argument descriptor is malformed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("command name must not be empty")]
    EmptyName,

    #[error("command name must be lowercase: {0}")]
    NameNotLowercase(String),

    #[error("command name must not contain whitespace: {0}")]
    NameWhitespace(String),

    #[error("command aliases must be lowercase: {0}")]
    AliasNotLowercase(String),

    #[error("command aliases must not contain whitespace: {0}")]
    AliasWhitespace(String),

    #[error("group id must be lowercase and non-empty: {0:?}")]
    GroupNotLowercase(String),

    #[error("member name must be lowercase and non-empty: {0:?}")]
    MemberNameNotLowercase(String),

    #[error("command {0} must have a description")]
    MissingDescription(String),

    #[error("invalid permission name: {0}")]
    UnknownPermission(String),

    #[error("throttling usages must be at least 1")]
    ThrottlingUsages,

    #[error("throttling duration must be at least 1 second")]
    ThrottlingDuration,

    #[error("args_count must be at least 2, got {0}")]
    ArgsCount(usize),

    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("argument key must not be empty")]
    EmptyArgumentKey,

    #[error("duplicate argument key: {0}")]
    DuplicateArgumentKey(String),

    #[error("argument {0} must have a prompt")]
    MissingPrompt(String),

    #[error("argument {key} uses unregistered type {kind:?}")]
    UnknownType { key: String, kind: String },

    #[error("argument {0} needs a type or both a custom validator and parser")]
    MissingType(String),

    #[error("argument {0} has min greater than max")]
    InvertedBounds(String),

    #[error("argument {0} wait must be at least 1 second")]
    WaitTooShort(String),

    #[error("only the last argument may be infinite: {0}")]
    InfiniteNotLast(String),

    #[error("required argument {0} follows an optional argument")]
    RequiredAfterOptional(String),
}

impl ValidationError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameNotLowercase(_) | Self::NameWhitespace(_) => "invalid_name",
            Self::AliasNotLowercase(_) | Self::AliasWhitespace(_) => "invalid_alias",
            Self::GroupNotLowercase(_) => "invalid_group",
            Self::MemberNameNotLowercase(_) => "invalid_member_name",
            Self::MissingDescription(_) => "missing_description",
            Self::UnknownPermission(_) => "unknown_permission",
            Self::ThrottlingUsages | Self::ThrottlingDuration => "invalid_throttling",
            Self::ArgsCount(_) => "invalid_args_count",
            Self::Pattern { .. } => "invalid_pattern",
            Self::EmptyArgumentKey
            | Self::DuplicateArgumentKey(_)
            | Self::MissingPrompt(_)
            | Self::UnknownType { .. }
            | Self::MissingType(_)
            | Self::InvertedBounds(_)
            | Self::WaitTooShort(_)
            | Self::InfiniteNotLast(_)
            | Self::RequiredAfterOptional(_) => "invalid_argument",
        }
    }
}

// ============================================================================
// Registration Errors (registry mutations)
// ============================================================================

/// A registry operation was rejected. The registry is left unchanged.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("a command with the name or alias {0:?} is already registered")]
    DuplicateName(String),

    #[error("group {group:?} is not registered (command {command})")]
    MissingGroup { command: String, group: String },

    #[error("a command with member name {member:?} is already registered in group {group:?}")]
    DuplicateMemberName { group: String, member: String },

    #[error("an unknown command is already registered: {0}")]
    DuplicateUnknown(String),

    #[error("an argument type with the id {0:?} is already registered")]
    DuplicateType(String),

    #[error("command {0:?} is not registered")]
    NotRegistered(String),

    #[error("replacement for {expected} must keep its name and group")]
    ReregisterMismatch { expected: String },

    #[error("failed to read command directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid command manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no handler bound for command {0}")]
    UnboundHandler(String),
}

impl RegistrationError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(e) => e.error_code(),
            Self::DuplicateName(_) => "duplicate_name",
            Self::MissingGroup { .. } => "missing_group",
            Self::DuplicateMemberName { .. } => "duplicate_member_name",
            Self::DuplicateUnknown(_) => "duplicate_unknown",
            Self::DuplicateType(_) => "duplicate_type",
            Self::NotRegistered(_) => "not_registered",
            Self::ReregisterMismatch { .. } => "reregister_mismatch",
            Self::Io { .. } => "io_error",
            Self::Manifest { .. } => "manifest_error",
            Self::UnboundHandler(_) => "unbound_handler",
        }
    }
}

// ============================================================================
// State Errors (runtime toggles)
// ============================================================================

/// A runtime state change was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("the {0} command is guarded")]
    GuardedCommand(String),

    #[error("the {0} group is guarded")]
    GuardedGroup(String),
}

// ============================================================================
// Command Errors (handler outcomes)
// ============================================================================

/// Failure returned by a command handler.
///
/// `Friendly` messages are shown to the user verbatim. Everything else is
/// logged and answered with the generic owner-contact reply.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Friendly(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("command handler panicked")]
    Panicked,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Shorthand for a message shown verbatim.
    pub fn friendly(message: impl Into<String>) -> Self {
        Self::Friendly(message.into())
    }

    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Friendly(_) => "friendly",
            Self::Client(_) => "client_error",
            Self::Settings(_) => "settings_error",
            Self::State(_) => "state_error",
            Self::Panicked => "panicked",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for command handlers.
pub type CommandResult = Result<(), CommandError>;
