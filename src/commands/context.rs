//! Per-invocation context handed to handlers and argument types.

use super::Command;
use crate::dispatcher::AwaitingGuard;
use crate::framework::Framework;
use crate::platform::{ClientError, ResponseTarget};
use commando_model::{Channel, Guild, GuildId, Interaction, Member, Message, User};
use std::sync::Arc;
use std::time::Duration;

/// What triggered the invocation.
#[derive(Debug, Clone)]
pub enum Source {
    Message(Message),
    Interaction(Interaction),
}

/// How the command was addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// `!ping`
    Prefix,
    /// `@Bot ping`
    Mention,
    /// `ping` in a direct message.
    DirectMessage,
    /// A command pattern matched the message.
    Pattern,
    /// A structured interaction.
    Interaction,
}

/// One command invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    framework: Arc<Framework>,
    source: Source,
    command: Option<Arc<Command>>,
    invoked_name: Option<String>,
    arg_string: String,
    pattern_matches: Vec<Option<String>>,
    prefix: Option<String>,
    mode: EntryMode,
}

impl CommandContext {
    /// Context for a plain message, with no command resolved yet.
    pub fn for_message(framework: Arc<Framework>, message: Message) -> Self {
        Self::new(framework, Source::Message(message), EntryMode::Prefix)
    }

    /// Context for a structured interaction.
    pub fn for_interaction(framework: Arc<Framework>, interaction: Interaction) -> Self {
        Self::new(framework, Source::Interaction(interaction), EntryMode::Interaction)
    }

    pub(crate) fn new(framework: Arc<Framework>, source: Source, mode: EntryMode) -> Self {
        Self {
            framework,
            source,
            command: None,
            invoked_name: None,
            arg_string: String::new(),
            pattern_matches: Vec::new(),
            prefix: None,
            mode,
        }
    }

    pub(crate) fn with_command(mut self, command: Option<Arc<Command>>, invoked_name: Option<String>) -> Self {
        self.command = command;
        self.invoked_name = invoked_name;
        self
    }

    pub(crate) fn with_arg_string(mut self, arg_string: impl Into<String>) -> Self {
        self.arg_string = arg_string.into();
        self
    }

    pub(crate) fn with_pattern_matches(mut self, matches: Vec<Option<String>>) -> Self {
        self.pattern_matches = matches;
        self
    }

    pub(crate) fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn framework(&self) -> &Arc<Framework> {
        &self.framework
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    /// The resolved command, if any.
    pub fn command(&self) -> Option<&Arc<Command>> {
        self.command.as_ref()
    }

    /// The token the user typed, before alias resolution.
    pub fn invoked_name(&self) -> Option<&str> {
        self.invoked_name.as_deref()
    }

    /// The unparsed text after the command token.
    pub fn arg_string(&self) -> &str {
        &self.arg_string
    }

    /// Captures of the pattern that triggered the command.
    pub fn pattern_matches(&self) -> &[Option<String>] {
        &self.pattern_matches
    }

    /// The prefix the message matched, if it used one.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn message(&self) -> Option<&Message> {
        match &self.source {
            Source::Message(m) => Some(m),
            Source::Interaction(_) => None,
        }
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        match &self.source {
            Source::Interaction(i) => Some(i),
            Source::Message(_) => None,
        }
    }

    pub fn author(&self) -> &User {
        match &self.source {
            Source::Message(m) => &m.author,
            Source::Interaction(i) => &i.user,
        }
    }

    pub fn channel(&self) -> &Channel {
        match &self.source {
            Source::Message(m) => &m.channel,
            Source::Interaction(i) => &i.channel,
        }
    }

    pub fn guild(&self) -> Option<&Guild> {
        match &self.source {
            Source::Message(m) => m.guild.as_deref(),
            Source::Interaction(i) => i.guild.as_deref(),
        }
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild().map(|g| g.id)
    }

    /// The author's membership in the current guild.
    pub fn member(&self) -> Option<&Member> {
        self.guild()?.member(self.author().id)
    }

    /// Where replies for this invocation go.
    pub fn target(&self) -> ResponseTarget {
        match &self.source {
            Source::Message(m) => ResponseTarget::Channel(m.channel.id),
            Source::Interaction(i) => ResponseTarget::Interaction(i.id),
        }
    }

    // ------------------------------------------------------------------------
    // Responses
    // ------------------------------------------------------------------------

    /// Reply to the author. Guild channel replies are prefixed with a mention.
    pub async fn reply(&self, content: &str) -> Result<(), ClientError> {
        let text = match &self.source {
            Source::Message(m) if m.channel.is_guild() => {
                format!("{}, {}", self.author().mention(), content)
            }
            _ => content.to_string(),
        };
        self.framework.client().send(self.target(), &text).await
    }

    /// Send `content` as is.
    pub async fn say(&self, content: &str) -> Result<(), ClientError> {
        self.framework.client().send(self.target(), content).await
    }

    /// Mark the author as answering a prompt in this channel until the guard drops.
    pub(crate) fn begin_awaiting(&self) -> AwaitingGuard {
        self.framework
            .awaiting()
            .begin(self.author().id, self.channel().id)
    }

    /// Wait for the author's next message in this channel.
    pub async fn await_reply(&self, wait: Duration) -> Option<Message> {
        self.framework
            .awaiting()
            .next(self.author().id, self.channel().id, wait)
            .await
    }

    /// Usage of the current command, rendered for this guild.
    pub fn usage(&self, arg_string: Option<&str>) -> String {
        let prefix = self.framework.prefix_for(self.guild_id());
        let user = self.framework.client().current_user();
        match &self.command {
            Some(command) => command.usage(arg_string, prefix.as_deref(), Some(user)),
            None => super::guard::usage(arg_string.unwrap_or(""), prefix.as_deref(), Some(user)),
        }
    }

    /// Usage of any command text, rendered for this guild.
    pub fn any_usage(&self, text: &str) -> String {
        let prefix = self.framework.prefix_for(self.guild_id());
        super::guard::usage(text, prefix.as_deref(), Some(self.framework.client().current_user()))
    }
}
