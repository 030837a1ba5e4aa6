// Improver Agent: turns the analysis into practical improvement points

use super::prompts::{self, PromptTemplate};
use super::{AgentError, AgentInvoker, AgentSpec, IMPROVER_AGENT};
use crate::birth_date::BirthDate;
use tracing::info;
use uuid::Uuid;

pub struct ImproverAgent {
    spec: AgentSpec,
}

impl ImproverAgent {
    pub fn new(model: &str) -> Self {
        Self {
            spec: AgentSpec::new(
                IMPROVER_AGENT,
                model,
                PromptTemplate::Improvement.instruction(),
            ),
        }
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub async fn improve(
        &self,
        invoker: &AgentInvoker,
        run_id: Uuid,
        date: &BirthDate,
        analysis: &str,
    ) -> Result<String, AgentError> {
        info!(
            "Improver: Finding improvement points ({} chars of analysis)",
            analysis.len()
        );
        invoker
            .invoke(run_id, &self.spec, &prompts::improvement_request(date, analysis))
            .await
    }
}
