use super::history::{DEFAULT_INSTRUCTION, HistoryHandle, SessionHistory};
use super::message::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the in-memory mapping from user id to live session history.
///
/// `SessionStore` is responsible for:
/// - Lazily creating a user's history on first access
/// - Guaranteeing exactly one history per user under concurrent first access
/// - Resetting a user's history back to the leading instruction
///
/// Construct one per process and share it (usually behind an `Arc`).
/// Sessions live until the store is dropped; idle sessions are never evicted.
pub struct SessionStore {
    /// In-memory session histories, keyed by user id
    sessions: RwLock<HashMap<String, HistoryHandle>>,
    /// Leading instruction for newly created histories
    default_instruction: String,
}

impl SessionStore {
    /// Creates a store whose new sessions start with `default_instruction`.
    pub fn new(default_instruction: impl Into<String>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_instruction: default_instruction.into(),
        }
    }

    pub fn default_instruction(&self) -> &str {
        &self.default_instruction
    }

    /// Returns the live history for `user_id`, creating it if needed.
    ///
    /// The fast path only takes the read lock. On a miss the write lock is
    /// acquired and presence is checked again before inserting, so racing
    /// first accesses for the same user all receive the same history.
    pub async fn get_or_create(&self, user_id: &str) -> HistoryHandle {
        if let Some(history) = self.sessions.read().await.get(user_id) {
            return Arc::clone(history);
        }

        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(user_id.to_string()).or_insert_with(|| {
            tracing::debug!(user_id, "Creating session history");
            Arc::new(SessionHistory::new(self.default_instruction.clone()))
        });
        Arc::clone(history)
    }

    /// Discards the history for `user_id` and starts a fresh one.
    ///
    /// Handles obtained before the reset keep pointing at the discarded
    /// history; callers must use the returned handle from now on.
    pub async fn reset(&self, user_id: &str) -> HistoryHandle {
        let mut sessions = self.sessions.write().await;
        sessions.remove(user_id);
        let history = Arc::new(SessionHistory::new(self.default_instruction.clone()));
        sessions.insert(user_id.to_string(), Arc::clone(&history));
        tracing::info!(user_id, "Session history reset");
        history
    }

    /// Appends `message` to the live history of `user_id`.
    pub async fn append(&self, user_id: &str, message: Message) {
        self.get_or_create(user_id).await.append(message).await;
    }

    /// Number of users with a live history.
    #[cfg(test)]
    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUCTION)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
