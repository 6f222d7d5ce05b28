//! Scripted collaborators for unit tests.

use async_trait::async_trait;
use confidant_core::generation::{ChatBackend, Summarizer};
use confidant_core::session::Message;
use confidant_core::{ConfidantError, Result};
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

/// Returns a fixed portrait and records every request it receives.
pub struct ScriptedSummarizer {
    reply: Result<String>,
    pub requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedSummarizer {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(ConfidantError::generation(message)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, messages: &[Message]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.reply.clone()
    }
}

/// Streams a fixed list of fragments, optionally failing afterwards.
pub struct ScriptedChat {
    fragments: Vec<String>,
    fail_with: Option<String>,
    pub seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedChat {
    pub fn streaming(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            fail_with: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_after(fragments: &[&str], message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::streaming(fragments)
        }
    }
}

#[async_trait]
impl ChatBackend for ScriptedChat {
    async fn stream_chat(
        &self,
        messages: Vec<Message>,
        fragments: UnboundedSender<String>,
    ) -> Result<()> {
        self.seen.lock().unwrap().push(messages);
        for fragment in &self.fragments {
            let _ = fragments.send(fragment.clone());
        }
        match &self.fail_with {
            Some(message) => Err(ConfidantError::generation(message.clone())),
            None => Ok(()),
        }
    }
}

/// Never finishes; used to exercise cancellation.
pub struct StalledChat;

#[async_trait]
impl ChatBackend for StalledChat {
    async fn stream_chat(
        &self,
        _messages: Vec<Message>,
        fragments: UnboundedSender<String>,
    ) -> Result<()> {
        let _ = fragments.send("partial".to_string());
        std::future::pending::<()>().await;
        Ok(())
    }
}
