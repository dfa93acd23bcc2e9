//! Routing of prompt answers.
//!
//! While a collector is prompting a user in a channel, that pair's messages
//! belong to the collector. The dispatcher hands them over here instead of
//! parsing them as commands.

use commando_model::{ChannelId, Message, UserId};
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::trace;

type Key = (UserId, ChannelId);

#[derive(Default)]
struct Slot {
    waiter: Option<oneshot::Sender<Message>>,
    /// An answer that arrived before anyone was waiting for it.
    early: Option<Message>,
}

/// Pending prompt answers keyed by (user, channel).
#[derive(Default)]
pub struct AwaitingReplies {
    pending: Arc<DashMap<Key, Slot>>,
}

impl std::fmt::Debug for AwaitingReplies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwaitingReplies")
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Keeps a (user, channel) pair routed to its prompt until dropped.
#[must_use]
pub struct AwaitingGuard {
    key: Key,
    pending: Weak<DashMap<Key, Slot>>,
}

impl Drop for AwaitingGuard {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.upgrade() {
            pending.remove(&self.key);
        }
    }
}

impl AwaitingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start routing the pair's messages to prompts.
    pub fn begin(&self, user: UserId, channel: ChannelId) -> AwaitingGuard {
        let key = (user, channel);
        self.pending.entry(key).or_default();
        AwaitingGuard {
            key,
            pending: Arc::downgrade(&self.pending),
        }
    }

    pub fn is_awaiting(&self, user: UserId, channel: ChannelId) -> bool {
        self.pending.contains_key(&(user, channel))
    }

    /// Wait up to `wait` for the pair's next message.
    pub async fn next(&self, user: UserId, channel: ChannelId, wait: Duration) -> Option<Message> {
        let (tx, rx) = oneshot::channel();
        let _scoped = (!self.is_awaiting(user, channel)).then(|| self.begin(user, channel));
        {
            let mut slot = self.pending.entry((user, channel)).or_default();
            if let Some(message) = slot.early.take() {
                return Some(message);
            }
            slot.waiter = Some(tx);
        }
        match tokio::time::timeout(wait, rx).await {
            Ok(Ok(message)) => Some(message),
            _ => {
                if let Some(mut slot) = self.pending.get_mut(&(user, channel)) {
                    slot.waiter = None;
                }
                None
            }
        }
    }

    /// Hand `message` to a waiting prompt. Returns true if the message was
    /// consumed and must not be dispatched.
    pub fn deliver(&self, message: &Message) -> bool {
        let key = (message.author.id, message.channel.id);
        let Some(mut slot) = self.pending.get_mut(&key) else {
            return false;
        };
        match slot.waiter.take() {
            Some(tx) => {
                if let Err(message) = tx.send(message.clone()) {
                    slot.early = Some(message);
                }
            }
            None => slot.early = Some(message.clone()),
        }
        trace!(user = %key.0, channel = %key.1, "routed prompt answer");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commando_model::{Channel, User};

    fn msg(content: &str) -> Message {
        Message::new(1u64, User::new(10u64, "alice"), content, Channel::dm(20u64))
    }

    #[tokio::test]
    async fn test_delivers_to_waiter() {
        let awaiting = Arc::new(AwaitingReplies::new());
        let _guard = awaiting.begin(UserId(10), ChannelId(20));
        let waiter = {
            let awaiting = awaiting.clone();
            tokio::spawn(async move {
                awaiting
                    .next(UserId(10), ChannelId(20), Duration::from_secs(5))
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert!(awaiting.deliver(&msg("42")));
        assert_eq!(waiter.await.unwrap().unwrap().content, "42");
    }

    #[tokio::test]
    async fn test_early_answer_is_kept() {
        let awaiting = AwaitingReplies::new();
        let _guard = awaiting.begin(UserId(10), ChannelId(20));
        assert!(awaiting.deliver(&msg("early")));
        let got = awaiting
            .next(UserId(10), ChannelId(20), Duration::from_secs(1))
            .await;
        assert_eq!(got.unwrap().content, "early");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_none() {
        let awaiting = AwaitingReplies::new();
        let _guard = awaiting.begin(UserId(10), ChannelId(20));
        let got = awaiting
            .next(UserId(10), ChannelId(20), Duration::from_secs(30))
            .await;
        assert!(got.is_none());
    }

    #[test]
    fn test_guard_drop_stops_routing() {
        let awaiting = AwaitingReplies::new();
        {
            let _guard = awaiting.begin(UserId(10), ChannelId(20));
            assert!(awaiting.is_awaiting(UserId(10), ChannelId(20)));
        }
        assert!(!awaiting.is_awaiting(UserId(10), ChannelId(20)));
        assert!(!awaiting.deliver(&msg("free")));
    }
}
