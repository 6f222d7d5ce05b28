//! Transcript rendering and the transcript repository contract.

use crate::error::Result;
use crate::session::Message;
use async_trait::async_trait;

/// Renders every non-system message as `"<Role>: <content>\n\n"`, in order.
///
/// The leading instruction never appears in a transcript.
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| !m.is_system())
        .map(|m| format!("{}: {}\n\n", m.role.label(), m.content))
        .collect()
}

/// Result of a successful save call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The transcript was written to `file_name` under the user's history directory.
    Saved { file_name: String },
    /// There was nothing but the leading instruction; no file was written.
    EmptyConversation,
}

/// Persistence contract for transcripts.
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    /// Writes the rendered transcript of `messages` to a freshly timestamped file.
    ///
    /// # Returns
    ///
    /// - `Ok(SaveOutcome::Saved)`: transcript written
    /// - `Ok(SaveOutcome::EmptyConversation)`: nothing to write
    /// - `Err(InvalidArgument)`: `user_id` is empty
    /// - `Err(Storage)`: the file could not be written
    async fn save(&self, user_id: &str, messages: &[Message]) -> Result<SaveOutcome>;

    /// Reads the raw content of a transcript.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: file content
    /// - `Err(NotFound)`: no such file under the user's history directory
    async fn load(&self, user_id: &str, file_name: &str) -> Result<String>;
}
