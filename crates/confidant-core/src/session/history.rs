//! Live session history and its leading instruction.

use super::message::{Message, MessageRole};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Leading instruction given to every new session.
pub const DEFAULT_INSTRUCTION: &str = "You are a professional psychological counselor and psychology expert. \
You are skilled at extracting a client's basic information from text and at conducting \
counseling grounded in that information.";

/// Heading that separates the base instruction from an injected portrait.
///
/// Must stay byte-identical across releases: re-injection finds the previous
/// block by searching for this exact string.
pub const PORTRAIT_MARKER: &str = "### User Portrait (for reference, do not display)";

/// Structured view of a session's leading instruction.
///
/// The rendered form is the plain `base` when no portrait is attached, or
/// `base + "\n" + PORTRAIT_MARKER + "\n" + portrait` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadingInstruction {
    base: String,
    portrait: Option<String>,
}

impl LeadingInstruction {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end().to_string(),
            portrait: None,
        }
    }

    /// Parses rendered instruction text.
    ///
    /// Everything from the first marker onwards is treated as the injected
    /// block; the base keeps the prefix with trailing whitespace trimmed.
    pub fn parse(content: &str) -> Self {
        match content.find(PORTRAIT_MARKER) {
            Some(idx) => {
                let portrait = content[idx + PORTRAIT_MARKER.len()..].trim();
                Self {
                    base: content[..idx].trim_end().to_string(),
                    portrait: Some(portrait.to_string()),
                }
            }
            None => Self::new(content),
        }
    }

    /// Replaces any attached portrait with `portrait` (trimmed).
    pub fn with_portrait(mut self, portrait: &str) -> Self {
        self.portrait = Some(portrait.trim().to_string());
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn portrait(&self) -> Option<&str> {
        self.portrait.as_deref()
    }

    pub fn render(&self) -> String {
        match &self.portrait {
            Some(portrait) => format!("{}\n{}\n{}", self.base, PORTRAIT_MARKER, portrait),
            None => self.base.clone(),
        }
    }
}

/// Shared reference to a live session history.
pub type HistoryHandle = Arc<SessionHistory>;

/// The ordered message sequence of one session.
///
/// Element 0 is always the `system` leading instruction; the API offers no
/// way to remove it or change its role.
#[derive(Debug)]
pub struct SessionHistory {
    messages: RwLock<Vec<Message>>,
}

impl SessionHistory {
    /// Creates a one-element history holding `instruction` as its system message.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            messages: RwLock::new(vec![Message::system(instruction)]),
        }
    }

    /// Appends a message in place; every holder of the handle observes it.
    pub async fn append(&self, message: Message) {
        self.messages.write().await.push(message);
    }

    /// Returns a copy of the current messages.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Number of user and assistant turns, i.e. everything but the leading instruction.
    pub async fn turn_count(&self) -> usize {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .count()
    }

    /// Current content of the leading instruction.
    pub async fn leading_instruction(&self) -> String {
        self.messages.read().await[0].content.clone()
    }

    /// Rewrites the leading instruction under a single write lock.
    ///
    /// `update` receives the current content and returns the replacement.
    pub async fn update_leading_instruction<F>(&self, update: F)
    where
        F: FnOnce(&str) -> String,
    {
        let mut messages = self.messages.write().await;
        let replacement = update(&messages[0].content);
        messages[0].content = replacement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_marker_keeps_base() {
        let instruction = LeadingInstruction::parse("Be kind.  \n");
        assert_eq!(instruction.base(), "Be kind.");
        assert_eq!(instruction.portrait(), None);
        assert_eq!(instruction.render(), "Be kind.");
    }

    #[test]
    fn test_render_with_portrait() {
        let rendered = LeadingInstruction::new("Be kind.")
            .with_portrait("\n- age: 30\n\n")
            .render();
        assert_eq!(
            rendered,
            format!("Be kind.\n{}\n- age: 30", PORTRAIT_MARKER)
        );
    }

    #[test]
    fn test_parse_strips_previous_block() {
        let rendered = format!("Be kind.\n{}\nold portrait", PORTRAIT_MARKER);
        let instruction = LeadingInstruction::parse(&rendered);
        assert_eq!(instruction.base(), "Be kind.");
        assert_eq!(instruction.portrait(), Some("old portrait"));

        let replaced = instruction.with_portrait("new portrait").render();
        assert_eq!(replaced.matches(PORTRAIT_MARKER).count(), 1);
        assert!(!replaced.contains("old portrait"));
        assert!(replaced.ends_with("new portrait"));
    }

    #[tokio::test]
    async fn test_history_starts_with_system_instruction() {
        let history = SessionHistory::new(DEFAULT_INSTRUCTION);
        let messages = history.snapshot().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, DEFAULT_INSTRUCTION);
        assert_eq!(history.turn_count().await, 0);
    }

    #[tokio::test]
    async fn test_append_is_visible_through_every_handle() {
        let handle: HistoryHandle = Arc::new(SessionHistory::new("sys"));
        let other = Arc::clone(&handle);

        handle.append(Message::user("A")).await;
        other.append(Message::assistant("B")).await;

        let messages = handle.snapshot().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], Message::user("A"));
        assert_eq!(messages[2], Message::assistant("B"));
        assert_eq!(other.turn_count().await, 2);
    }

    #[tokio::test]
    async fn test_update_leading_instruction() {
        let history = SessionHistory::new("sys");
        history
            .update_leading_instruction(|current| format!("{current} extended"))
            .await;
        assert_eq!(history.leading_instruction().await, "sys extended");
        assert_eq!(history.len().await, 1);
    }
}
