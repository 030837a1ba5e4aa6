// Analyzer Agent: six-part personality reading of a birth date

use super::prompts::{self, PromptTemplate};
use super::{AgentError, AgentInvoker, AgentSpec, Capability, ANALYZER_AGENT};
use crate::birth_date::BirthDate;
use tracing::info;
use uuid::Uuid;

pub struct AnalyzerAgent {
    spec: AgentSpec,
}

impl AnalyzerAgent {
    pub fn new(model: &str) -> Self {
        Self {
            spec: AgentSpec::new(ANALYZER_AGENT, model, PromptTemplate::Analyzer.instruction())
                .with_capability(Capability::WebSearch),
        }
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub async fn analyze(
        &self,
        invoker: &AgentInvoker,
        run_id: Uuid,
        date: &BirthDate,
    ) -> Result<String, AgentError> {
        info!("Analyzer: Analyzing birth date {}", date);
        invoker
            .invoke(run_id, &self.spec, &prompts::analyzer_request(date))
            .await
    }
}
