//! Streamed chat turns against a user's live session.

use confidant_core::generation::ChatBackend;
use confidant_core::session::{Message, SessionStore};
use confidant_core::{ConfidantError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Runs free-text chat turns.
///
/// The backend produces fragments on a spawned task; this service is the
/// single consumer. The assistant reply is committed to the history only
/// once the producer has finished successfully.
pub struct ConversationService {
    store: Arc<SessionStore>,
}

impl ConversationService {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Sends `input` as the next user turn and returns the full reply.
    ///
    /// `on_fragment` sees every fragment as it arrives. On backend failure
    /// or cancellation the user turn stays in the history, no assistant turn
    /// is appended, and a `Generation` error is returned.
    pub async fn send<F>(
        &self,
        user_id: &str,
        input: &str,
        backend: Arc<dyn ChatBackend>,
        mut on_fragment: F,
        cancel: &CancellationToken,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        if user_id.is_empty() {
            return Err(ConfidantError::invalid_argument("no user specified"));
        }

        let history = self.store.get_or_create(user_id).await;
        history.append(Message::user(input)).await;
        let messages = history.snapshot().await;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let producer = tokio::spawn(async move { backend.stream_chat(messages, tx).await });

        let mut reply = String::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    producer.abort();
                    tracing::warn!(user_id, "Chat turn cancelled");
                    return Err(ConfidantError::generation("chat turn cancelled"));
                }
                fragment = rx.recv() => match fragment {
                    Some(fragment) => {
                        on_fragment(&fragment);
                        reply.push_str(&fragment);
                    }
                    None => break,
                },
            }
        }

        match producer.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(user_id, error = %err, "Chat backend failed");
                return Err(match err {
                    ConfidantError::Generation(_) => err,
                    other => ConfidantError::generation(other.to_string()),
                });
            }
            Err(join_err) => {
                return Err(ConfidantError::generation(format!(
                    "chat producer task failed: {join_err}"
                )));
            }
        }

        history.append(Message::assistant(reply.clone())).await;
        tracing::debug!(user_id, chars = reply.len(), "Chat turn committed");
        Ok(reply)
    }
}
