// Agent Invoker: one fresh conversation per call, final text only

use super::AgentSpec;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("prompt blocked by provider: {0}")]
    Blocked(String),

    #[error("could not decode provider response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("conversation {0} already exists")]
    ConversationExists(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("agent {0} returned no final response")]
    EmptyResponse(String),
}

/// A unit of output emitted by the provider while answering one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEvent {
    pub parts: Vec<String>,
    pub is_final: bool,
}

impl ResponseEvent {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            parts: vec![text.into()],
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![text.into()],
            is_final: true,
        }
    }
}

pub type EventStream = BoxStream<'static, Result<ResponseEvent, ProviderError>>;

/// Boundary to the model provider. Implementations send the request as a
/// single user turn and stream back the events of that turn.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn open(
        &self,
        spec: &AgentSpec,
        conversation_id: &str,
        request: &str,
    ) -> Result<EventStream, ProviderError>;
}

/// Live conversation ids. An id can only be held by one invocation at a time.
#[derive(Debug, Clone, Default)]
pub struct ConversationRegistry {
    live: Arc<Mutex<HashSet<String>>>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, id: &str) -> Result<ConversationGuard, AgentError> {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        if !live.insert(id.to_string()) {
            return Err(AgentError::ConversationExists(id.to_string()));
        }
        Ok(ConversationGuard {
            id: id.to_string(),
            live: Arc::clone(&self.live),
        })
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Releases its conversation id when dropped.
#[derive(Debug)]
pub struct ConversationGuard {
    id: String,
    live: Arc<Mutex<HashSet<String>>>,
}

impl ConversationGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for ConversationGuard {
    fn drop(&mut self) {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

/// Appends a fragment, making sure the accumulated text ends with a newline.
pub fn append_fragment(acc: &mut String, fragment: &str) {
    acc.push_str(fragment);
    if !acc.ends_with('\n') {
        acc.push('\n');
    }
}

#[derive(Clone)]
pub struct AgentInvoker {
    provider: Arc<dyn LlmProvider>,
    conversations: ConversationRegistry,
}

impl AgentInvoker {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            conversations: ConversationRegistry::new(),
        }
    }

    pub fn conversations(&self) -> &ConversationRegistry {
        &self.conversations
    }

    pub fn conversation_id(run_id: Uuid, spec: &AgentSpec) -> String {
        format!("{}:{}", run_id, spec.name)
    }

    /// Runs one request through `spec` and returns the concatenated text of
    /// every final response event.
    pub async fn invoke(
        &self,
        run_id: Uuid,
        spec: &AgentSpec,
        request: &str,
    ) -> Result<String, AgentError> {
        let conversation = self
            .conversations
            .create(&Self::conversation_id(run_id, spec))?;

        info!(
            agent = %spec.name,
            model = %spec.model,
            conversation = %conversation.id(),
            search = spec.has_web_search(),
            "Invoking agent"
        );

        let mut events = self
            .provider
            .open(spec, conversation.id(), request)
            .await?;

        let mut response = String::new();
        let mut partials = 0usize;
        while let Some(event) = events.next().await {
            let event = event?;
            if !event.is_final {
                partials += 1;
                continue;
            }
            for part in &event.parts {
                append_fragment(&mut response, part);
            }
        }

        debug!(agent = %spec.name, partials, "Event stream finished");

        if response.is_empty() {
            warn!(agent = %spec.name, "No final response received");
            return Err(AgentError::EmptyResponse(spec.name.clone()));
        }

        Ok(response)
    }
}
