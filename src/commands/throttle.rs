//! Per-user command throttling.
//!
//! Each throttled command owns a [`ThrottleTable`]. A user's window opens on
//! first use and closes `duration` seconds later, at which point a timer
//! drops the record. Timers hold only a weak reference to the table and are
//! aborted when the table is cleared or dropped.

use commando_model::UserId;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

/// Throttling policy: at most `usages` runs per `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Throttling {
    pub usages: u32,
    pub duration: u64,
}

impl Throttling {
    pub fn new(usages: u32, duration: u64) -> Self {
        Self { usages, duration }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.duration)
    }
}

/// Snapshot of one user's current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleState {
    pub start: Instant,
    pub usages: u32,
    pub duration: Duration,
}

impl ThrottleState {
    /// Time left until the window resets.
    pub fn remaining(&self) -> Duration {
        (self.start + self.duration).saturating_duration_since(Instant::now())
    }
}

struct Entry {
    start: Instant,
    usages: u32,
    expiry: Option<AbortHandle>,
}

/// Throttle records for one command, keyed by user.
pub struct ThrottleTable {
    policy: Throttling,
    entries: Arc<DashMap<UserId, Entry>>,
}

impl ThrottleTable {
    pub fn new(policy: Throttling) -> Self {
        Self {
            policy,
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn policy(&self) -> Throttling {
        self.policy
    }

    /// The user's current window, opening a new one if none is active.
    pub fn window(&self, user: UserId) -> ThrottleState {
        let now = Instant::now();
        let duration = self.policy.window();
        let mut entry = self
            .entries
            .entry(user)
            .or_insert_with(|| self.open(user, now));
        if now.duration_since(entry.start) >= duration {
            if let Some(timer) = entry.expiry.take() {
                timer.abort();
            }
            *entry = self.open(user, now);
        }
        ThrottleState {
            start: entry.start,
            usages: entry.usages,
            duration,
        }
    }

    /// Count one use inside the user's current window.
    pub fn record(&self, user: UserId) -> u32 {
        self.window(user);
        match self.entries.get_mut(&user) {
            Some(mut entry) => {
                entry.usages += 1;
                entry.usages
            }
            None => 0,
        }
    }

    /// Whether a record exists for the user.
    pub fn contains(&self, user: UserId) -> bool {
        self.entries.contains_key(&user)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every record and cancel pending timers.
    pub fn clear(&self) {
        for entry in self.entries.iter() {
            if let Some(timer) = &entry.expiry {
                timer.abort();
            }
        }
        self.entries.clear();
    }

    fn open(&self, user: UserId, start: Instant) -> Entry {
        let expiry = Handle::try_current().ok().map(|rt| {
            let entries: Weak<DashMap<UserId, Entry>> = Arc::downgrade(&self.entries);
            let deadline = start + self.policy.window();
            rt.spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if let Some(entries) = entries.upgrade() {
                    entries.remove_if(&user, |_, e| e.start == start);
                    trace!(user = %user, "throttle window expired");
                }
            })
            .abort_handle()
        });
        Entry {
            start,
            usages: 0,
            expiry,
        }
    }
}

impl Drop for ThrottleTable {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for ThrottleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottleTable")
            .field("policy", &self.policy)
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_window_counts_usages() {
        let table = ThrottleTable::new(Throttling::new(2, 10));
        assert_eq!(table.window(UserId(1)).usages, 0);
        assert_eq!(table.record(UserId(1)), 1);
        assert_eq!(table.record(UserId(1)), 2);
        let state = table.window(UserId(1));
        assert_eq!(state.usages, 2);
        assert!(state.remaining() > Duration::ZERO);
        assert_eq!(table.window(UserId(2)).usages, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_removes_record_after_duration() {
        let table = ThrottleTable::new(Throttling::new(1, 5));
        table.record(UserId(1));
        assert!(table.contains(UserId(1)));
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!table.contains(UserId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_records() {
        let table = ThrottleTable::new(Throttling::new(1, 5));
        table.record(UserId(1));
        table.record(UserId(2));
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.window(UserId(1)).usages, 0);
    }

    #[test]
    fn test_works_without_runtime() {
        let table = ThrottleTable::new(Throttling::new(3, 60));
        assert_eq!(table.record(UserId(9)), 1);
        assert_eq!(table.window(UserId(9)).usages, 1);
    }
}
