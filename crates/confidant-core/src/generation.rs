//! Contracts for the external text-generation collaborators.
//!
//! The core never talks to a model directly. It hands a message sequence to
//! one of these traits and gets text back.

use crate::error::Result;
use crate::session::Message;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

/// Produces a portrait text from a portrait request.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generates the full reply for `messages` and returns it in one piece.
    ///
    /// May take a long time; implementations must not retry internally.
    /// Any failure is reported as a `Generation` error.
    async fn summarize(&self, messages: &[Message]) -> Result<String>;
}

/// Produces a chat reply incrementally.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Streams the reply to `messages` into `fragments`.
    ///
    /// The concatenation of all sent fragments is the full reply. Returning
    /// drops the sender, which closes the channel for the consumer.
    async fn stream_chat(
        &self,
        messages: Vec<Message>,
        fragments: UnboundedSender<String>,
    ) -> Result<()>;
}
