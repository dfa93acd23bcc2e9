//! Pre-dispatch inhibitors.
//!
//! Inhibitors run in registration order once a command has been resolved.
//! The first one to return an [`Inhibition`] stops the invocation.

use crate::commands::CommandContext;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// A refusal from an inhibitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inhibition {
    /// Block reason code reported on `CommandBlock`.
    pub reason: String,
    /// Reply sent to the user, if any.
    pub response: Option<String>,
}

impl Inhibition {
    pub fn silent(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            response: None,
        }
    }

    pub fn with_response(reason: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            response: Some(response.into()),
        }
    }
}

#[async_trait]
pub trait Inhibitor: Send + Sync {
    /// `None` lets the invocation proceed.
    async fn inhibit(&self, ctx: &CommandContext) -> Option<Inhibition>;
}

#[async_trait]
impl<F> Inhibitor for F
where
    F: Fn(&CommandContext) -> Option<Inhibition> + Send + Sync,
{
    async fn inhibit(&self, ctx: &CommandContext) -> Option<Inhibition> {
        self(ctx)
    }
}

/// Ordered inhibitor list.
#[derive(Default)]
pub struct Inhibitors {
    list: RwLock<Vec<Arc<dyn Inhibitor>>>,
}

fn same(a: &Arc<dyn Inhibitor>, b: &Arc<dyn Inhibitor>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl Inhibitors {
    /// Add an inhibitor. Returns false if this exact one is already present.
    pub fn add(&self, inhibitor: Arc<dyn Inhibitor>) -> bool {
        let mut list = self.list.write();
        if list.iter().any(|i| same(i, &inhibitor)) {
            return false;
        }
        list.push(inhibitor);
        true
    }

    /// Remove an inhibitor previously added. Returns false if absent.
    pub fn remove(&self, inhibitor: &Arc<dyn Inhibitor>) -> bool {
        let mut list = self.list.write();
        let before = list.len();
        list.retain(|i| !same(i, inhibitor));
        list.len() != before
    }

    pub fn len(&self) -> usize {
        self.list.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.read().is_empty()
    }

    /// First inhibition for `ctx`, if any.
    pub async fn check(&self, ctx: &CommandContext) -> Option<Inhibition> {
        let list = self.list.read().clone();
        for inhibitor in list {
            if let Some(inhibition) = inhibitor.inhibit(ctx).await {
                return Some(inhibition);
            }
        }
        None
    }
}

impl std::fmt::Debug for Inhibitors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inhibitors").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maintenance(_ctx: &CommandContext) -> Option<Inhibition> {
        Some(Inhibition::silent("maintenance"))
    }

    #[test]
    fn test_add_and_remove_by_identity() {
        let inhibitors = Inhibitors::default();
        let a: Arc<dyn Inhibitor> = Arc::new(maintenance);
        let b: Arc<dyn Inhibitor> = Arc::new(maintenance);
        assert!(inhibitors.add(a.clone()));
        assert!(!inhibitors.add(a.clone()));
        assert!(inhibitors.add(b.clone()));
        assert!(inhibitors.remove(&a));
        assert!(!inhibitors.remove(&a));
        assert_eq!(inhibitors.len(), 1);
    }
}
