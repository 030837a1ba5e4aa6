//! Scripted provider shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::{stream, StreamExt};
use purpose_orchestrator::agents::{
    AgentSpec, EventStream, LlmProvider, ModelTiers, ProviderError, ResponseEvent,
    ANALYZER_AGENT, IMPROVER_AGENT, REPORTER_AGENT, SUCCESS_SEARCHER_AGENT,
};
use purpose_orchestrator::metrics::Metrics;
use purpose_orchestrator::pipeline::{Pipeline, PipelineSettings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FAST_MODEL: &str = "fast-model";
pub const ROBUST_MODEL: &str = "robust-model";

/// What the provider saw for one invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub agent: String,
    pub model: String,
    pub web_search: bool,
    pub conversation_id: String,
    pub request: String,
}

#[derive(Clone)]
enum Script {
    Reply(String),
    Fail(String),
    Hang,
}

#[derive(Default)]
pub struct StubProvider {
    scripts: HashMap<String, Script>,
    latency: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub answering "A", "B", one table line and "R" for the four stages.
    pub fn happy_path() -> Self {
        Self::new()
            .reply(ANALYZER_AGENT, "A")
            .reply(IMPROVER_AGENT, "B")
            .reply(
                SUCCESS_SEARCHER_AGENT,
                "* Nome: X | Profissão: Y | Sucesso: Z | Site: W",
            )
            .reply(REPORTER_AGENT, "R")
    }

    pub fn reply(mut self, agent: &str, text: &str) -> Self {
        self.scripts
            .insert(agent.to_string(), Script::Reply(text.to_string()));
        self
    }

    pub fn fail(mut self, agent: &str, message: &str) -> Self {
        self.scripts
            .insert(agent.to_string(), Script::Fail(message.to_string()));
        self
    }

    pub fn hang(mut self, agent: &str) -> Self {
        self.scripts.insert(agent.to_string(), Script::Hang);
        self
    }

    /// Every scripted reply waits this long before it starts streaming.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn agents_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.agent).collect()
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn open(
        &self,
        spec: &AgentSpec,
        conversation_id: &str,
        request: &str,
    ) -> Result<EventStream, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            agent: spec.name.clone(),
            model: spec.model.clone(),
            web_search: spec.has_web_search(),
            conversation_id: conversation_id.to_string(),
            request: request.to_string(),
        });

        let script = self.scripts.get(&spec.name).cloned();
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match script {
            Some(Script::Reply(text)) => Ok(stream::iter(vec![
                Ok(ResponseEvent::partial("...")),
                Ok(ResponseEvent::final_text(text)),
            ])
            .boxed()),
            Some(Script::Fail(message)) => Err(ProviderError::Api {
                status: 500,
                message,
            }),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(stream::empty().boxed())
            }
            None => Err(ProviderError::Api {
                status: 404,
                message: format!("no script for {}", spec.name),
            }),
        }
    }
}

pub fn settings(stage_timeout: Duration) -> PipelineSettings {
    PipelineSettings {
        models: ModelTiers::new(FAST_MODEL, ROBUST_MODEL),
        stage_timeout,
    }
}

pub fn pipeline(provider: Arc<StubProvider>) -> (Pipeline, Metrics) {
    pipeline_with_timeout(provider, Duration::from_secs(5))
}

pub fn pipeline_with_timeout(
    provider: Arc<StubProvider>,
    stage_timeout: Duration,
) -> (Pipeline, Metrics) {
    let metrics = Metrics::new().unwrap();
    let pipeline = Pipeline::new(provider, settings(stage_timeout), metrics.clone());
    (pipeline, metrics)
}
