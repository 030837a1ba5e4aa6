// Reporter Agent: composes the final document from every upstream result

use super::prompts::{self, PromptTemplate};
use super::{AgentError, AgentInvoker, AgentSpec, REPORTER_AGENT};
use crate::birth_date::BirthDate;
use crate::extractor::SuccessTable;
use tracing::info;
use uuid::Uuid;

pub struct ReporterAgent {
    spec: AgentSpec,
}

impl ReporterAgent {
    pub fn new(model: &str) -> Self {
        Self {
            spec: AgentSpec::new(REPORTER_AGENT, model, PromptTemplate::Report.instruction()),
        }
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub async fn compose(
        &self,
        invoker: &AgentInvoker,
        run_id: Uuid,
        date: &BirthDate,
        analysis: &str,
        improvement: &str,
        table: &SuccessTable,
    ) -> Result<String, AgentError> {
        info!("Reporter: Composing final report");
        let request = prompts::report_request(date, analysis, improvement, table);
        invoker.invoke(run_id, &self.spec, &request).await
    }
}
