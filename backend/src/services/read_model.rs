//! Ticketed read-model cell
//!
//! A refresh takes a ticket before it starts, computes its result off to the
//! side, then publishes it in a single swap. A result whose ticket is older
//! than the one already stored is dropped, so concurrent refreshes resolve
//! last-issued-wins regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

/// Counter of refresh results dropped for being stale
pub const STALE_REFRESHES: &str = "gains_tracker_stale_refreshes_total";

pub struct Ticketed<T> {
    name: &'static str,
    next: AtomicU64,
    current: RwLock<(u64, Arc<T>)>,
}

impl<T> Ticketed<T> {
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            next: AtomicU64::new(1),
            current: RwLock::new((0, Arc::new(initial))),
        }
    }

    /// Reserve the ticket for a refresh about to start
    pub fn issue(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Store `value` unless a newer ticket already published.
    /// Returns whether the value was stored.
    pub async fn publish(&self, ticket: u64, value: T) -> bool {
        let mut current = self.current.write().await;
        if ticket < current.0 {
            debug!(model = self.name, ticket, stored = current.0, "Discarding stale refresh");
            metrics::counter!(STALE_REFRESHES, "model" => self.name).increment(1);
            return false;
        }
        *current = (ticket, Arc::new(value));
        true
    }

    pub async fn read(&self) -> Arc<T> {
        Arc::clone(&self.current.read().await.1)
    }

    /// Ticket of the stored value, 0 before the first publish
    pub async fn version(&self) -> u64 {
        self.current.read().await.0
    }
}

impl<T: Clone> Ticketed<T> {
    /// Apply a local edit under the write lock and store it with a fresh ticket
    pub async fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut T),
    {
        let mut current = self.current.write().await;
        let mut value = (*current.1).clone();
        edit(&mut value);
        let ticket = self.issue();
        *current = (ticket, Arc::new(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_replaces_value() {
        let cell = Ticketed::new("test", 0u32);
        let ticket = cell.issue();
        assert!(cell.publish(ticket, 7).await);
        assert_eq!(*cell.read().await, 7);
        assert_eq!(cell.version().await, ticket);
    }

    #[tokio::test]
    async fn test_older_ticket_is_discarded() {
        let cell = Ticketed::new("test", "initial".to_string());
        let first = cell.issue();
        let second = cell.issue();

        // The later refresh finishes first
        assert!(cell.publish(second, "second".to_string()).await);
        assert!(!cell.publish(first, "first".to_string()).await);

        assert_eq!(cell.read().await.as_str(), "second");
    }

    #[tokio::test]
    async fn test_update_supersedes_inflight_refresh() {
        let cell = Ticketed::new("test", vec![1]);
        let refresh = cell.issue();

        cell.update(|v| v.push(2)).await;
        assert_eq!(*cell.read().await, vec![1, 2]);

        // A refresh that started before the local edit is older
        assert!(!cell.publish(refresh, vec![9]).await);
        assert_eq!(*cell.read().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_readers_keep_their_snapshot() {
        let cell = Ticketed::new("test", 1);
        let before = cell.read().await;
        let ticket = cell.issue();
        cell.publish(ticket, 2).await;
        assert_eq!(*before, 1);
        assert_eq!(*cell.read().await, 2);
    }
}
