//! Per-user conversation history with serialized access per user id.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use vitalis_core::Turn;

/// Exclusive handle on one user's history; other requests for the same user
/// wait until it is dropped.
pub type ConversationGuard = OwnedMutexGuard<Vec<Turn>>;

/// In-memory conversation store keyed by user id.
///
/// Users are never evicted; each entry lives for the lifetime of the process.
#[derive(Default)]
pub struct ConversationStore {
    conversations: DashMap<String, Arc<Mutex<Vec<Turn>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, user_id: &str) -> Arc<Mutex<Vec<Turn>>> {
        self.conversations
            .entry(user_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Snapshot of a user's turns, empty when the user is unknown.
    pub async fn get(&self, user_id: &str) -> Vec<Turn> {
        let slot = self.conversations.get(user_id).map(|e| e.value().clone());
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Replaces a user's turns entirely.
    pub async fn set(&self, user_id: &str, turns: Vec<Turn>) {
        *self.slot(user_id).lock().await = turns;
    }

    /// Locks a user's history for a read-modify-write, creating it if needed.
    pub async fn lock(&self, user_id: &str) -> ConversationGuard {
        self.slot(user_id).lock_owned().await
    }

    /// Number of users with a history entry.
    pub fn user_count(&self) -> usize {
        self.conversations.len()
    }
}

/// Drops the oldest turns so at most `limit` remain, keeping order.
pub fn retain_recent(turns: &mut Vec<Turn>, limit: usize) {
    if turns.len() > limit {
        let excess = turns.len() - limit;
        turns.drain(..excess);
    }
}
