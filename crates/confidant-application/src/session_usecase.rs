//! Session use case implementation.
//!
//! `SessionUseCase` is the single entry point for front ends. Each operation
//! corresponds to one REPL command and yields exactly one human-readable
//! status line.

use crate::conversation_service::ConversationService;
use crate::portrait_service::PortraitService;
use crate::prompt_injector::PromptInjector;
use confidant_core::generation::{ChatBackend, Summarizer};
use confidant_core::portrait::GeneratedPortrait;
use confidant_core::session::SessionStore;
use confidant_core::transcript::{SaveOutcome, TranscriptRepository};
use confidant_core::Result;
use confidant_infrastructure::{
    AsyncDirPortraitRepository, AsyncDirTranscriptRepository, FileCatalog, UserDirectoryLayout,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result of a free-text chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The full reply, already shown fragment by fragment.
    Replied(String),
    /// The turn failed; carries the status line to show instead.
    Failed(String),
}

/// Facade over the session store, the file-backed repositories, and the
/// generation collaborators.
///
/// # Error policy
///
/// Non-fatal failures are folded into the returned status line. Only fatal
/// errors (see [`confidant_core::ConfidantError::is_fatal`]) are returned as `Err`, and the
/// caller is expected to stop.
pub struct SessionUseCase {
    /// In-memory session histories
    store: Arc<SessionStore>,
    /// Per-user directory layout
    layout: UserDirectoryLayout,
    /// Listing of persisted transcripts and portraits
    catalog: FileCatalog,
    transcripts: Arc<dyn TranscriptRepository>,
    portrait_service: PortraitService,
    injector: PromptInjector,
    conversation: ConversationService,
    summarizer: Arc<dyn Summarizer>,
    chat_backend: Arc<dyn ChatBackend>,
}

impl SessionUseCase {
    /// Creates a new `SessionUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `layout` - Directory layout rooted at the user-data base
    /// * `store` - Session store shared with any other front end
    /// * `portrait_label` - Prefix of generated portrait file names
    /// * `summarizer` - Collaborator producing portraits
    /// * `chat_backend` - Collaborator streaming chat replies
    pub fn new(
        layout: UserDirectoryLayout,
        store: Arc<SessionStore>,
        portrait_label: impl Into<String>,
        summarizer: Arc<dyn Summarizer>,
        chat_backend: Arc<dyn ChatBackend>,
    ) -> Self {
        let transcripts: Arc<dyn TranscriptRepository> =
            Arc::new(AsyncDirTranscriptRepository::new(layout.clone()));
        let portraits = Arc::new(AsyncDirPortraitRepository::new(layout.clone()));

        Self {
            catalog: FileCatalog::new(layout.clone()),
            portrait_service: PortraitService::new(
                transcripts.clone(),
                portraits.clone(),
                portrait_label,
            ),
            injector: PromptInjector::new(store.clone(), portraits),
            conversation: ConversationService::new(store.clone()),
            transcripts,
            layout,
            store,
            summarizer,
            chat_backend,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Creates the user's directories and session.
    ///
    /// Fails only when the layout cannot be created.
    pub async fn prepare_user(&self, user_id: &str) -> Result<String> {
        settle("Cannot prepare user", self.try_prepare_user(user_id).await)
    }

    /// Saves the current conversation as a transcript.
    pub async fn save_conversation(&self, user_id: &str) -> Result<String> {
        settle("Save failed", self.try_save_conversation(user_id).await)
    }

    /// Lists saved transcripts, one `  - name` line each.
    pub async fn list_history(&self, user_id: &str) -> Result<String> {
        let result = self.catalog.list_history_files(user_id).await;
        settle(
            "Cannot list conversations",
            result.map(|files| render_listing("Saved conversation files:", &files)),
        )
    }

    /// Lists generated portraits, one `  - name` line each.
    pub async fn list_portraits(&self, user_id: &str) -> Result<String> {
        let result = self.catalog.list_portrait_files(user_id).await;
        settle(
            "Cannot list portraits",
            result.map(|files| render_listing("Generated portrait files:", &files)),
        )
    }

    /// Most recent transcript, offered as the default for `/gen portrait`.
    pub async fn suggest_history_file(&self, user_id: &str) -> Option<String> {
        self.catalog
            .latest_history_file(user_id)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(user_id, error = %err, "Cannot look up latest transcript");
                None
            })
    }

    /// Most recent portrait, offered as the default for `/inject portrait`.
    pub async fn suggest_portrait_file(&self, user_id: &str) -> Option<String> {
        self.catalog
            .latest_portrait_file(user_id)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(user_id, error = %err, "Cannot look up latest portrait");
                None
            })
    }

    /// Generates a portrait from the transcript `file_name`.
    ///
    /// `on_generated` receives the portrait before the status line is
    /// returned, so the caller can display its content.
    pub async fn generate_portrait<F>(
        &self,
        user_id: &str,
        file_name: &str,
        on_generated: F,
    ) -> Result<String>
    where
        F: FnOnce(&GeneratedPortrait),
    {
        let result = self
            .portrait_service
            .generate_from_file(user_id, file_name, self.summarizer.as_ref())
            .await
            .map(|portrait| {
                on_generated(&portrait);
                format!("Portrait generated and saved to {}", portrait.file_name)
            });
        settle("Portrait generation failed", result)
    }

    /// Injects the portrait `file_name` into the current conversation.
    pub async fn inject_portrait(&self, user_id: &str, file_name: &str) -> Result<String> {
        let result = self
            .injector
            .inject(user_id, file_name)
            .await
            .map(|()| format!("Injected {file_name} into the current conversation."));
        settle("Injection failed", result)
    }

    /// Discards the conversation and starts over from the leading instruction.
    pub async fn reset_session(&self, user_id: &str) -> Result<String> {
        self.store.reset(user_id).await;
        Ok("Conversation reset.".to_string())
    }

    async fn try_prepare_user(&self, user_id: &str) -> Result<String> {
        self.layout.ensure(user_id).await?;
        self.store.get_or_create(user_id).await;
        Ok(format!("Session ready for user '{user_id}'."))
    }

    async fn try_save_conversation(&self, user_id: &str) -> Result<String> {
        let messages = self.store.get_or_create(user_id).await.snapshot().await;
        Ok(match self.transcripts.save(user_id, &messages).await? {
            SaveOutcome::Saved { file_name } => format!("Conversation saved to {file_name}"),
            SaveOutcome::EmptyConversation => "Conversation is empty, nothing to save.".to_string(),
        })
    }

    /// Runs one free-text turn, streaming fragments to `on_fragment`.
    pub async fn chat<F>(
        &self,
        user_id: &str,
        input: &str,
        on_fragment: F,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome>
    where
        F: FnMut(&str),
    {
        let result = self
            .conversation
            .send(
                user_id,
                input,
                self.chat_backend.clone(),
                on_fragment,
                cancel,
            )
            .await;
        match result {
            Ok(reply) => Ok(TurnOutcome::Replied(reply)),
            Err(err) => settle("Reply failed", Err(err)).map(TurnOutcome::Failed),
        }
    }
}

/// Folds a non-fatal error into a status line.
fn settle(context: &str, result: Result<String>) -> Result<String> {
    match result {
        Ok(status) => Ok(status),
        Err(err) if err.is_fatal() => {
            tracing::error!(error = %err, "{context}");
            Err(err)
        }
        Err(err) => {
            tracing::warn!(error = %err, "{context}");
            Ok(format!("{context}: {err}"))
        }
    }
}

fn render_listing(heading: &str, files: &[String]) -> String {
    let mut out = heading.to_string();
    if files.is_empty() {
        out.push_str("\n  - none");
    }
    for file in files {
        out.push_str("\n  - ");
        out.push_str(file);
    }
    out
}

#[cfg(test)]
#[path = "session_usecase_test.rs"]
mod tests;
