//! Framework notifications.
//!
//! Everything observable about registration and dispatch is announced on
//! an [`EventBus`]. Hosts may subscribe for logging or metrics. The
//! settings provider uses [`EventBus::subscribe_state`] instead, which
//! delivers prefix and enable-flag changes without ever dropping one.

use std::sync::Arc;

use commando_model::{ChannelId, GuildId, UserId};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

/// Events emitted by the framework.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameworkEvent {
    GroupRegistered {
        group: String,
    },
    CommandRegistered {
        command: String,
    },
    CommandReregistered {
        command: String,
    },
    CommandUnregistered {
        command: String,
    },
    TypeRegistered {
        id: String,
    },
    CommandRun {
        command: String,
        user: UserId,
        guild: Option<GuildId>,
    },
    /// A guard, inhibitor or permission check stopped a command.
    CommandBlock {
        command: String,
        user: UserId,
        reason: String,
    },
    /// Argument collection was cancelled by the user or timed out.
    CommandCancel {
        command: String,
        user: UserId,
        reason: String,
    },
    CommandError {
        command: String,
        user: UserId,
        error: String,
    },
    /// Input addressed the bot but matched no runnable command.
    UnknownCommand {
        user: UserId,
        channel: ChannelId,
        content: String,
    },
    /// `prefix` of `None` means the guild went back to the default.
    CommandPrefixChange {
        guild: Option<GuildId>,
        prefix: Option<String>,
    },
    CommandStatusChange {
        guild: Option<GuildId>,
        command: String,
        enabled: bool,
    },
    GroupStatusChange {
        guild: Option<GuildId>,
        group: String,
        enabled: bool,
    },
    ProviderReady,
}

impl FrameworkEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GroupRegistered { .. } => "groupRegister",
            Self::CommandRegistered { .. } => "commandRegister",
            Self::CommandReregistered { .. } => "commandReregister",
            Self::CommandUnregistered { .. } => "commandUnregister",
            Self::TypeRegistered { .. } => "typeRegister",
            Self::CommandRun { .. } => "commandRun",
            Self::CommandBlock { .. } => "commandBlock",
            Self::CommandCancel { .. } => "commandCancel",
            Self::CommandError { .. } => "commandError",
            Self::UnknownCommand { .. } => "unknownCommand",
            Self::CommandPrefixChange { .. } => "commandPrefixChange",
            Self::CommandStatusChange { .. } => "commandStatusChange",
            Self::GroupStatusChange { .. } => "groupStatusChange",
            Self::ProviderReady => "providerReady",
        }
    }

    /// Whether the event changes or reapplies persisted settings.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            Self::CommandPrefixChange { .. }
                | Self::CommandStatusChange { .. }
                | Self::GroupStatusChange { .. }
                | Self::GroupRegistered { .. }
                | Self::CommandRegistered { .. }
                | Self::CommandReregistered { .. }
        )
    }
}

/// Broadcast channel for [`FrameworkEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FrameworkEvent>,
    state: Arc<Mutex<Vec<mpsc::UnboundedSender<FrameworkEvent>>>>,
}

impl EventBus {
    /// Default buffer for slow subscribers.
    pub const CAPACITY: usize = 256;

    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(Self::CAPACITY);
        Self {
            tx,
            state: Arc::default(),
        }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: FrameworkEvent) {
        if event.is_state_change() {
            self.state.lock().retain(|tx| tx.send(event.clone()).is_ok());
        }
        let _ = self.tx.send(event);
    }

    /// Subscribe to every event. Receivers that fall more than
    /// [`Self::CAPACITY`] events behind skip the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<FrameworkEvent> {
        self.tx.subscribe()
    }

    /// Subscribe to state changes only (see
    /// [`FrameworkEvent::is_state_change`]). The queue is unbounded, so a
    /// slow receiver never loses one.
    pub fn subscribe_state(&self) -> mpsc::UnboundedReceiver<FrameworkEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().push(tx);
        rx
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.emit(FrameworkEvent::ProviderReady);
    }

    #[tokio::test]
    async fn test_subscribers_see_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.emit(FrameworkEvent::TypeRegistered { id: "integer".into() });
        bus.emit(FrameworkEvent::ProviderReady);
        assert_eq!(rx.recv().await.unwrap().name(), "typeRegister");
        assert_eq!(rx.recv().await.unwrap(), FrameworkEvent::ProviderReady);
    }

    fn run(n: u64) -> FrameworkEvent {
        FrameworkEvent::CommandRun {
            command: "ping".into(),
            user: UserId(n),
            guild: None,
        }
    }

    #[tokio::test]
    async fn test_state_subscribers_survive_floods() {
        let bus = EventBus::new();
        let mut all = bus.subscribe();
        let mut state = bus.subscribe_state();

        bus.emit(FrameworkEvent::CommandPrefixChange {
            guild: Some(GuildId(500)),
            prefix: Some("?".into()),
        });
        for n in 0..(EventBus::CAPACITY as u64 + 44) {
            bus.emit(run(n));
        }
        bus.emit(FrameworkEvent::CommandStatusChange {
            guild: None,
            command: "ping".into(),
            enabled: false,
        });

        assert!(matches!(
            all.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert_eq!(
            state.recv().await.unwrap(),
            FrameworkEvent::CommandPrefixChange {
                guild: Some(GuildId(500)),
                prefix: Some("?".into()),
            }
        );
        assert_eq!(state.recv().await.unwrap().name(), "commandStatusChange");
        assert!(state.try_recv().is_err());
    }

    #[test]
    fn test_dropped_state_subscribers_are_pruned() {
        let bus = EventBus::new();
        drop(bus.subscribe_state());
        let _kept = bus.subscribe_state();
        bus.emit(FrameworkEvent::GroupRegistered { group: "util".into() });
        assert_eq!(bus.state.lock().len(), 1);
    }
}
