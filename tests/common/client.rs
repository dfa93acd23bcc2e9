//! Recording chat client.

use async_trait::async_trait;
use commando::model::{ChannelId, Message, MessageId, User};
use commando::{ChatClient, ClientError, ResponseTarget};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// A [`ChatClient`] that records everything sent through it.
pub struct MockClient {
    bot: User,
    sent: Mutex<Vec<(ResponseTarget, String)>>,
    notify: Notify,
}

#[allow(dead_code)]
impl MockClient {
    pub fn new(bot: User) -> Self {
        Self {
            bot,
            sent: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<(ResponseTarget, String)> {
        self.sent.lock().clone()
    }

    /// Text of every message sent so far.
    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, text)| text.clone()).collect()
    }

    /// Most recently sent text.
    pub fn last(&self) -> Option<String> {
        self.sent.lock().last().map(|(_, text)| text.clone())
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    /// Wait until at least `count` messages were sent, or panic after a second.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        loop {
            let notified = self.notify.notified();
            let texts = self.texts();
            if texts.len() >= count {
                return texts;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                panic!("expected {} sent messages, got {:?}", count, self.texts());
            }
        }
    }
}

#[async_trait]
impl ChatClient for MockClient {
    fn current_user(&self) -> &User {
        &self.bot
    }

    async fn send(&self, target: ResponseTarget, content: &str) -> Result<(), ClientError> {
        self.sent.lock().push((target, content.to_string()));
        self.notify.notify_waiters();
        Ok(())
    }

    async fn fetch_message(
        &self,
        _channel: ChannelId,
        _id: MessageId,
    ) -> Result<Option<Message>, ClientError> {
        Ok(None)
    }
}
