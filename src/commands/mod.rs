//! Commands, groups and everything that runs before a handler.
//!
//! - [`CommandInfo`] / [`Command`]: descriptors and their validated form
//! - [`guard`]: block reasons, permission outcomes and stock replies
//! - [`throttle`]: per-user usage windows
//! - [`ArgumentCollector`]: schema-driven argument collection and prompting
//! - [`CommandContext`]: what a handler sees

mod argument;
mod collector;
mod command;
mod context;
pub mod guard;
mod group;
mod info;
mod parse;
pub mod throttle;

pub use argument::{
    ArgDefault, Argument, ArgumentInfo, CancelReason, CustomParser, CustomValidator, Rejection,
    RejectionKind,
};
pub use collector::{
    ArgumentCollector, ArgumentValues, CollectMode, Collected, CollectionFailure, FailureReason,
};
pub use command::{Command, CommandFactory, CommandHandler, CommandSource};
pub use context::{CommandContext, EntryMode, Source};
pub use group::{Group, GroupInfo};
pub use guard::{BlockReason, PermissionCheck};
pub use info::{ArgsType, CommandInfo};
pub use parse::{parse_args, remove_smart_quotes, strip_quotes};
pub use throttle::{ThrottleState, Throttling};
