//! OpenAIApiAgent - REST client for OpenAI-compatible chat completion servers.
//!
//! Works against the hosted OpenAI API as well as local servers exposing the
//! same `/v1/chat/completions` route (vLLM, llama.cpp, Ollama).

use crate::sse::{SseDecoder, SseEvent};
use async_trait::async_trait;
use confidant_core::config::{GenerationSettings, SamplingSettings};
use confidant_core::generation::{ChatBackend, Summarizer};
use confidant_core::session::Message;
use confidant_core::{ConfidantError, Result};
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Agent implementation that talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAIApiAgent {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    chat_sampling: SamplingSettings,
    portrait_sampling: SamplingSettings,
}

impl OpenAIApiAgent {
    /// Creates a new agent for `endpoint` (base URL ending in `/v1`) and `model`.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            chat_sampling: SamplingSettings::chat(),
            portrait_sampling: SamplingSettings::portrait(),
        }
    }

    /// Builds an agent from configuration, applying the request timeout.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| ConfidantError::config(format!("Failed to build HTTP client: {e}")))?;

        let mut agent = Self::new(settings.endpoint.clone(), settings.model.clone());
        agent.client = client;
        agent.api_key = settings.api_key.clone().filter(|k| !k.is_empty());
        Ok(agent)
    }

    /// Overrides sampling for streamed chat turns.
    pub fn with_chat_sampling(mut self, sampling: SamplingSettings) -> Self {
        self.chat_sampling = sampling;
        self
    }

    /// Overrides sampling for portrait generation.
    pub fn with_portrait_sampling(mut self, sampling: SamplingSettings) -> Self {
        self.portrait_sampling = sampling;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    fn post(&self, body: &ChatCompletionRequest<'_>) -> RequestBuilder {
        let request = self
            .client
            .post(self.completions_url())
            .header("content-type", "application/json")
            .json(body);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn request_body<'a>(
        &'a self,
        messages: &'a [Message],
        sampling: &SamplingSettings,
        stream: bool,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            stream,
        }
    }

    async fn send(&self, body: &ChatCompletionRequest<'_>) -> Result<reqwest::Response> {
        let response = self.post(body).send().await.map_err(|err| {
            ConfidantError::generation(format!("Chat completion request failed: {err}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl Summarizer for OpenAIApiAgent {
    async fn summarize(&self, messages: &[Message]) -> Result<String> {
        let body = self.request_body(messages, &self.portrait_sampling, false);
        tracing::debug!(model = %self.model, messages = messages.len(), "Requesting completion");

        let parsed: ChatCompletionResponse = self.send(&body).await?.json().await.map_err(|err| {
            ConfidantError::generation(format!("Failed to parse completion response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ChatBackend for OpenAIApiAgent {
    async fn stream_chat(
        &self,
        messages: Vec<Message>,
        fragments: UnboundedSender<String>,
    ) -> Result<()> {
        let body = self.request_body(&messages, &self.chat_sampling, true);
        tracing::debug!(model = %self.model, messages = messages.len(), "Requesting streamed completion");

        let mut stream = self.send(&body).await?.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| {
                ConfidantError::generation(format!("Completion stream interrupted: {err}"))
            })?;
            for event in decoder.push(&chunk) {
                if !forward_event(event, &fragments)? {
                    return Ok(());
                }
            }
        }

        if let Some(event) = decoder.finish() {
            forward_event(event, &fragments)?;
        }
        Ok(())
    }
}

/// Sends the text of one event; returns `false` once the stream should stop.
fn forward_event(event: SseEvent, fragments: &UnboundedSender<String>) -> Result<bool> {
    let data = match event {
        SseEvent::Done => return Ok(false),
        SseEvent::Data(data) => data,
    };

    let chunk: ChatCompletionChunk = serde_json::from_str(&data)?;
    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();

    if text.is_empty() {
        return Ok(true);
    }
    // A closed receiver means nobody is listening any more.
    Ok(fragments.send(text).is_ok())
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ConfidantError::generation("API returned no content in the response"))
}

fn map_http_error(status: StatusCode, body: String) -> ConfidantError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    ConfidantError::generation(format!("HTTP {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_completions_url_handles_trailing_slash() {
        let agent = OpenAIApiAgent::new("http://localhost:8000/v1/", "m");
        assert_eq!(
            agent.completions_url(),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_serialization() {
        let agent = OpenAIApiAgent::new("http://localhost:8000/v1", "psy");
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let body = agent.request_body(&messages, &SamplingSettings::portrait(), false);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "psy");
        assert_eq!(json["stream"], false);
        assert_eq!(json["max_tokens"], 2048);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_extract_text_response() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"- Age: not mentioned"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_text_response(parsed).unwrap(),
            "- Age: not mentioned"
        );
    }

    #[test]
    fn test_extract_text_response_without_choices() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_text_response(parsed).unwrap_err().is_generation());
    }

    #[test]
    fn test_map_http_error_uses_api_message() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid API key","type":"auth"}}"#.to_string(),
        );
        assert_eq!(err.to_string(), "Generation error: HTTP 401: Invalid API key");
    }

    #[test]
    fn test_map_http_error_falls_back_to_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(err.to_string(), "Generation error: HTTP 502: upstream down");
    }

    #[test]
    fn test_forward_event_sends_delta_content() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let keep_going = forward_event(
            SseEvent::Data(r#"{"choices":[{"delta":{"content":"Tell "}}]}"#.to_string()),
            &tx,
        )
        .unwrap();
        assert!(keep_going);
        assert_eq!(rx.try_recv().unwrap(), "Tell ");
    }

    #[test]
    fn test_forward_event_skips_role_only_delta() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let keep_going = forward_event(
            SseEvent::Data(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#.to_string()),
            &tx,
        )
        .unwrap();
        assert!(keep_going);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_forward_event_stops_on_done() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(!forward_event(SseEvent::Done, &tx).unwrap());
    }

    #[test]
    fn test_forward_event_rejects_malformed_chunk() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = forward_event(SseEvent::Data("{not json".to_string()), &tx).unwrap_err();
        assert!(err.is_generation());
    }
}
