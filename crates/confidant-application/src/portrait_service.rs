//! Portrait generation: transcript in, summarizer call, portrait file out.

use confidant_core::generation::Summarizer;
use confidant_core::naming::validate_segment;
use confidant_core::portrait::{GeneratedPortrait, PortraitRepository, build_portrait_request};
use confidant_core::transcript::TranscriptRepository;
use confidant_core::{ConfidantError, Result};
use std::sync::Arc;

/// Derives a portrait document from a saved transcript.
pub struct PortraitService {
    transcripts: Arc<dyn TranscriptRepository>,
    portraits: Arc<dyn PortraitRepository>,
    label: String,
}

impl PortraitService {
    /// Creates a service writing portraits named `<label>_<timestamp>.txt`.
    pub fn new(
        transcripts: Arc<dyn TranscriptRepository>,
        portraits: Arc<dyn PortraitRepository>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            transcripts,
            portraits,
            label: label.into(),
        }
    }

    /// Generates and persists a portrait for the transcript `file_name`.
    ///
    /// The summarizer call is awaited directly and never retried. Nothing is
    /// written unless both the transcript load and the summarizer succeed.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: `user_id` or `file_name` is empty, or the label
    ///   is not a single path component
    /// - `NotFound`: no such transcript
    /// - `Generation`: the summarizer failed
    /// - `Storage` / `Layout`: the portrait could not be written
    pub async fn generate_from_file(
        &self,
        user_id: &str,
        file_name: &str,
        summarizer: &dyn Summarizer,
    ) -> Result<GeneratedPortrait> {
        if user_id.is_empty() {
            return Err(ConfidantError::invalid_argument("no user specified"));
        }
        if file_name.is_empty() {
            return Err(ConfidantError::invalid_argument(
                "no conversation file given",
            ));
        }
        validate_segment("portrait label", &self.label)?;

        let transcript = self.transcripts.load(user_id, file_name).await?;
        let request = build_portrait_request(&transcript);

        tracing::info!(user_id, source = file_name, "Generating portrait");
        let content = summarizer.summarize(&request).await?;

        let file_name = self.portraits.save(user_id, &self.label, &content).await?;
        tracing::info!(user_id, file = %file_name, "Portrait generated");

        Ok(GeneratedPortrait { file_name, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSummarizer;
    use confidant_core::portrait::PORTRAIT_INSTRUCTION;
    use confidant_core::session::{Message, MessageRole};
    use confidant_core::transcript::SaveOutcome;
    use confidant_infrastructure::{
        AsyncDirPortraitRepository, AsyncDirTranscriptRepository, FileCatalog,
        UserDirectoryLayout,
    };
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        transcripts: Arc<AsyncDirTranscriptRepository>,
        catalog: FileCatalog,
        service: PortraitService,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let layout = UserDirectoryLayout::new(temp_dir.path());
        let transcripts = Arc::new(AsyncDirTranscriptRepository::new(layout.clone()));
        let portraits = Arc::new(AsyncDirPortraitRepository::new(layout.clone()));
        let service = PortraitService::new(transcripts.clone(), portraits, "user_portrait");
        Fixture {
            _temp_dir: temp_dir,
            transcripts,
            catalog: FileCatalog::new(layout),
            service,
        }
    }

    async fn save_transcript(fixture: &Fixture, user_id: &str) -> String {
        let messages = vec![
            Message::system("sys"),
            Message::user("I feel anxious"),
            Message::assistant("Tell me more"),
        ];
        match fixture.transcripts.save(user_id, &messages).await.unwrap() {
            SaveOutcome::Saved { file_name } => file_name,
            other => panic!("expected a saved transcript, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_writes_summarizer_output_verbatim() {
        let fixture = fixture();
        let transcript_file = save_transcript(&fixture, "alice").await;
        let summarizer = ScriptedSummarizer::replying("- Emotional state: anxious\n");

        let portrait = fixture
            .service
            .generate_from_file("alice", &transcript_file, &summarizer)
            .await
            .unwrap();

        assert!(portrait.file_name.starts_with("user_portrait_"));
        assert_eq!(portrait.content, "- Emotional state: anxious\n");

        let files = fixture.catalog.list_portrait_files("alice").await.unwrap();
        assert_eq!(files, vec![portrait.file_name.clone()]);
    }

    #[tokio::test]
    async fn test_request_carries_instruction_and_transcript() {
        let fixture = fixture();
        let transcript_file = save_transcript(&fixture, "alice").await;
        let summarizer = ScriptedSummarizer::replying("p");

        fixture
            .service
            .generate_from_file("alice", &transcript_file, &summarizer)
            .await
            .unwrap();

        let requests = summarizer.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request[0].role, MessageRole::System);
        assert_eq!(request[0].content, PORTRAIT_INSTRUCTION);
        assert_eq!(
            request[1].content,
            "User: I feel anxious\n\nAssistant: Tell me more\n\n"
        );
    }

    #[tokio::test]
    async fn test_missing_transcript_is_not_found_and_writes_nothing() {
        let fixture = fixture();
        let summarizer = ScriptedSummarizer::replying("p");

        let err = fixture
            .service
            .generate_from_file("alice", "history_19990101_000000.txt", &summarizer)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(summarizer.request_count(), 0);
        assert!(
            fixture
                .catalog
                .list_portrait_files("alice")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_empty_arguments_are_rejected() {
        let fixture = fixture();
        let summarizer = ScriptedSummarizer::replying("p");

        let err = fixture
            .service
            .generate_from_file("alice", "", &summarizer)
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = fixture
            .service
            .generate_from_file("", "history_x.txt", &summarizer)
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_summarizer_failure_writes_nothing() {
        let fixture = fixture();
        let transcript_file = save_transcript(&fixture, "alice").await;
        let summarizer = ScriptedSummarizer::failing("model offline");

        let err = fixture
            .service
            .generate_from_file("alice", &transcript_file, &summarizer)
            .await
            .unwrap_err();

        assert!(err.is_generation());
        assert!(
            fixture
                .catalog
                .list_portrait_files("alice")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_escaping_label_is_rejected_before_generation() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("base");
        let layout = UserDirectoryLayout::new(&base);
        let transcripts = Arc::new(AsyncDirTranscriptRepository::new(layout.clone()));
        let portraits = Arc::new(AsyncDirPortraitRepository::new(layout.clone()));
        let service = PortraitService::new(transcripts.clone(), portraits, "../../../escaped");
        let fixture = Fixture {
            _temp_dir: temp_dir,
            transcripts,
            catalog: FileCatalog::new(layout),
            service,
        };
        let transcript_file = save_transcript(&fixture, "alice").await;
        let summarizer = ScriptedSummarizer::replying("p");

        let err = fixture
            .service
            .generate_from_file("alice", &transcript_file, &summarizer)
            .await
            .unwrap_err();

        assert!(err.is_invalid_argument());
        assert_eq!(summarizer.request_count(), 0);
        let entries: Vec<_> = std::fs::read_dir(fixture._temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("base")]);
    }
}
