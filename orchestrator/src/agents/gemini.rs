// Gemini provider: streams generateContent over server-sent events
//
// Every SSE chunk becomes a partial event. When the model reports a finish
// reason, the text seen so far is re-emitted as a single final event, which
// is the only thing the invoker keeps.

use super::invoker::{EventStream, LlmProvider, ProviderError, ResponseEvent};
use super::AgentSpec;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub connect_timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn open(
        &self,
        spec: &AgentSpec,
        conversation_id: &str,
        request: &str,
    ) -> Result<EventStream, ProviderError> {
        let url = self.stream_url(&spec.model);
        debug!(conversation = conversation_id, model = %spec.model, "Opening Gemini stream");

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&GenerateContentRequest::new(spec, request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(event_stream(response.bytes_stream().boxed()))
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(spec: &'a AgentSpec, request: &'a str) -> Self {
        let tools = if spec.has_web_search() {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            vec![]
        };

        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &spec.instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: request }],
            }],
            tools,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

// --- SSE decoding ---

/// Incremental server-sent-events decoder. Only `data:` fields are kept;
/// one payload is produced per blank-line-terminated event.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    data: String,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            self.line(line.trim_end_matches(['\n', '\r']), &mut payloads);
        }
        payloads
    }

    fn finish(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let rest = String::from_utf8_lossy(&rest).into_owned();
            self.line(rest.trim_end_matches('\r'), &mut payloads);
        }
        self.line("", &mut payloads);
        payloads
    }

    fn line(&mut self, line: &str, payloads: &mut Vec<String>) {
        if line.is_empty() {
            if !self.data.is_empty() {
                payloads.push(std::mem::take(&mut self.data));
            }
            return;
        }
        if let Some(value) = line.strip_prefix("data:") {
            if !self.data.is_empty() {
                self.data.push('\n');
            }
            self.data.push_str(value.strip_prefix(' ').unwrap_or(value));
        }
    }
}

struct EventState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    aggregate: String,
    pending: VecDeque<Result<ResponseEvent, ProviderError>>,
    final_sent: bool,
    done: bool,
}

impl EventState {
    fn new(body: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            body,
            decoder: SseDecoder::default(),
            aggregate: String::new(),
            pending: VecDeque::new(),
            final_sent: false,
            done: false,
        }
    }

    fn fail(&mut self, err: ProviderError) {
        self.pending.push_back(Err(err));
        self.done = true;
    }

    fn handle_payload(&mut self, payload: &str) {
        if self.done {
            return;
        }

        let chunk: GenerateContentChunk = match serde_json::from_str(payload) {
            Ok(chunk) => chunk,
            Err(e) => return self.fail(ProviderError::Decode(e.to_string())),
        };

        if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
            return self.fail(ProviderError::Blocked(reason));
        }

        let Some(candidate) = chunk.candidates.into_iter().next() else {
            return;
        };

        let text: String = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if !text.is_empty() {
            self.aggregate.push_str(&text);
            self.pending.push_back(Ok(ResponseEvent::partial(text)));
        }

        if let Some(reason) = candidate.finish_reason {
            self.complete(Some(&reason));
        }
    }

    fn complete(&mut self, reason: Option<&str>) {
        if self.final_sent {
            return;
        }
        self.final_sent = true;

        if !self.aggregate.is_empty() {
            let text = std::mem::take(&mut self.aggregate);
            self.pending.push_back(Ok(ResponseEvent::final_text(text)));
        } else if let Some(reason) = reason.filter(|r| *r != "STOP") {
            self.fail(ProviderError::Blocked(format!("finish reason {}", reason)));
        }
    }

    fn finish(&mut self) {
        for payload in self.decoder.finish() {
            self.handle_payload(&payload);
        }
        if !self.done {
            self.complete(None);
        }
        self.done = true;
    }
}

fn event_stream(body: BoxStream<'static, reqwest::Result<Bytes>>) -> EventStream {
    stream::unfold(EventState::new(body), |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for payload in state.decoder.push(&chunk) {
                        state.handle_payload(&payload);
                    }
                }
                Some(Err(e)) => state.fail(e.into()),
                None => state.finish(),
            }
        }
    })
    .boxed()
}
