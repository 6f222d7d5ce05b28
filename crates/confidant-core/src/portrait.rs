//! Portrait request construction and the portrait repository contract.
//!
//! A portrait is a structured summary of one transcript, produced by the
//! external summarizer and stored verbatim.

use crate::error::Result;
use crate::session::Message;
use async_trait::async_trait;

/// System instruction sent with every portrait request.
pub const PORTRAIT_INSTRUCTION: &str = "You are a professional psychological counselor and text analysis expert. \
The user will give you a complete conversation. Extract information ONLY along the following nine points \
and produce a structured user portrait (a Markdown list is fine). \
Do not continue the conversation and do not add unrelated content. \
Any point not covered by the conversation must be written as \"not mentioned\":\n\
1. Basic information (age, gender, occupation, living situation)\n\
2. Emotional state\n\
3. Psychological needs and goals\n\
4. Coping mechanisms\n\
5. Cognitive patterns\n\
6. Social support and relationships\n\
7. Quality of life\n\
8. Cognitive and affective tendencies\n\
9. Reactions during counseling";

/// Builds the fixed two-message portrait request for `transcript`.
pub fn build_portrait_request(transcript: &str) -> Vec<Message> {
    vec![
        Message::system(PORTRAIT_INSTRUCTION),
        Message::user(transcript),
    ]
}

/// A portrait that has just been generated and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPortrait {
    /// File name under the user's portrait directory.
    pub file_name: String,
    /// Raw summarizer output, exactly as written to the file.
    pub content: String,
}

/// Persistence contract for portraits.
#[async_trait]
pub trait PortraitRepository: Send + Sync {
    /// Writes `content` unmodified to `<label>_<timestamp>.txt` and returns the file name.
    async fn save(&self, user_id: &str, label: &str, content: &str) -> Result<String>;

    /// Reads the raw content of a portrait.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: file content
    /// - `Err(NotFound)`: no such file under the user's portrait directory
    async fn load(&self, user_id: &str, file_name: &str) -> Result<String>;
}
