//! Directory-backed TranscriptRepository implementation.

use crate::user_layout::UserDirectoryLayout;
use async_trait::async_trait;
use confidant_core::naming::transcript_file_name;
use confidant_core::session::Message;
use confidant_core::transcript::{SaveOutcome, TranscriptRepository, render_transcript};
use confidant_core::{ConfidantError, Result};
use tokio::fs;

/// Stores transcripts as plain text files under `<base>/<user_id>/history/`.
///
/// Two saves within the same second target the same file name; the later
/// write replaces the earlier one.
#[derive(Debug, Clone)]
pub struct AsyncDirTranscriptRepository {
    layout: UserDirectoryLayout,
}

impl AsyncDirTranscriptRepository {
    pub fn new(layout: UserDirectoryLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl TranscriptRepository for AsyncDirTranscriptRepository {
    async fn save(&self, user_id: &str, messages: &[Message]) -> Result<SaveOutcome> {
        if user_id.is_empty() {
            return Err(ConfidantError::invalid_argument(
                "cannot save a conversation without a user",
            ));
        }

        let transcript = render_transcript(messages);
        if transcript.trim().is_empty() {
            tracing::debug!(user_id, "Nothing to save");
            return Ok(SaveOutcome::EmptyConversation);
        }

        let dir = self.layout.ensure_history_dir(user_id).await?;
        let file_name = transcript_file_name(chrono::Local::now());
        let path = dir.join(&file_name);

        fs::write(&path, transcript)
            .await
            .map_err(|e| ConfidantError::storage(&path, e))?;

        tracing::info!(user_id, file = %file_name, "Transcript saved");
        Ok(SaveOutcome::Saved { file_name })
    }

    async fn load(&self, user_id: &str, file_name: &str) -> Result<String> {
        let path = self.layout.history_file(user_id, file_name)?;
        if !fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Err(ConfidantError::not_found("Transcript", file_name));
        }

        fs::read_to_string(&path)
            .await
            .map_err(|e| ConfidantError::storage(&path, e))
    }
}
