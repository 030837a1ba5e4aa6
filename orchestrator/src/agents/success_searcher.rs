// Success Searcher Agent: finds people born on the same date and tabulates them

use super::prompts::{self, PromptTemplate};
use super::{AgentError, AgentInvoker, AgentSpec, Capability, SUCCESS_SEARCHER_AGENT};
use crate::birth_date::BirthDate;
use crate::extractor::{self, SuccessTable};
use tracing::{info, warn};
use uuid::Uuid;

/// Number of people the search prompt asks for (5 men, 5 women).
pub const TARGET_RECORDS: usize = 10;

pub struct SuccessSearcherAgent {
    spec: AgentSpec,
}

impl SuccessSearcherAgent {
    pub fn new(model: &str) -> Self {
        Self {
            spec: AgentSpec::new(
                SUCCESS_SEARCHER_AGENT,
                model,
                PromptTemplate::SuccessSearch.instruction(),
            )
            .with_capability(Capability::WebSearch),
        }
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    /// Returns the extracted table. A short or empty table is not an error.
    pub async fn search(
        &self,
        invoker: &AgentInvoker,
        run_id: Uuid,
        date: &BirthDate,
    ) -> Result<SuccessTable, AgentError> {
        info!("SuccessSearcher: Searching people born on {}", date);

        let raw = invoker
            .invoke(run_id, &self.spec, &prompts::success_search_request(date))
            .await?;

        let table = extractor::extract(&raw);
        let discarded = extractor::discarded_candidates(&raw);

        if discarded > 0 {
            warn!(discarded, "SuccessSearcher: Dropped malformed record lines");
        }
        if table.len() < TARGET_RECORDS {
            warn!(
                extracted = table.len(),
                expected = TARGET_RECORDS,
                "SuccessSearcher: Fewer records than requested"
            );
        }

        info!("SuccessSearcher: Extracted {} records", table.len());
        Ok(table)
    }
}
