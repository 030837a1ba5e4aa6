//! Pipeline orchestrator: four agent stages run strictly in sequence.
//!
//! ```text
//! birth date
//!     ↓
//! [1: Analyzer]          (search, fast model)   → analysis
//!     ↓
//! [2: Improver]          (fast model)           → improvement points
//!     ↓
//! [3: Success Searcher]  (search, robust model) → success table
//!     ↓
//! [4: Reporter]          (fast model)           → final report
//! ```
//!
//! Every prompt after the first embeds earlier output, so a stage only starts
//! once the previous one has returned its full text. Any stage failure aborts
//! the run; nothing is retried.

use crate::agents::{
    AgentError, AgentInvoker, AnalyzerAgent, ImproverAgent, LlmProvider, ModelTier, ModelTiers,
    ReporterAgent, SuccessSearcherAgent,
};
use crate::birth_date::BirthDate;
use crate::extractor::SuccessTable;
use crate::metrics::Metrics;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyzer,
    Improvement,
    SuccessSearch,
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyzer => "analyzer",
            Stage::Improvement => "improvement",
            Stage::SuccessSearch => "success_search",
            Stage::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: AgentError,
    },

    #[error("{stage} stage timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Stage { stage, .. } | PipelineError::Timeout { stage, .. } => *stage,
        }
    }
}

/// Result of one completed run. Lives only as long as the request that made it.
#[derive(Debug, Clone)]
pub struct FinalReport {
    pub run_id: Uuid,
    pub birth_date: BirthDate,
    pub content: String,
    pub success_table: SuccessTable,
}

impl FinalReport {
    /// Report text ready for display and download.
    pub fn document(&self) -> String {
        normalize_bullets(&self.content)
    }

    pub fn file_name(&self) -> String {
        report_file_name(&self.birth_date)
    }
}

/// Models sometimes answer with `•` bullets; markdown wants `*`.
pub fn normalize_bullets(text: &str) -> String {
    text.replace('•', "*")
}

pub fn report_file_name(date: &BirthDate) -> String {
    format!("relatorio_personalidade_{}.md", date.file_stem())
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub models: ModelTiers,
    pub stage_timeout: Duration,
}

pub struct Pipeline {
    invoker: AgentInvoker,
    analyzer: AnalyzerAgent,
    improver: ImproverAgent,
    success_searcher: SuccessSearcherAgent,
    reporter: ReporterAgent,
    stage_timeout: Duration,
    metrics: Metrics,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: PipelineSettings, metrics: Metrics) -> Self {
        let models = &settings.models;
        Self {
            invoker: AgentInvoker::new(provider),
            analyzer: AnalyzerAgent::new(models.resolve(ModelTier::Fast)),
            improver: ImproverAgent::new(models.resolve(ModelTier::Fast)),
            success_searcher: SuccessSearcherAgent::new(models.resolve(ModelTier::Robust)),
            reporter: ReporterAgent::new(models.resolve(ModelTier::Fast)),
            stage_timeout: settings.stage_timeout,
            metrics,
        }
    }

    pub fn invoker(&self) -> &AgentInvoker {
        &self.invoker
    }

    /// Runs all four stages under a freshly generated run id.
    pub async fn run(&self, date: &BirthDate) -> Result<FinalReport, PipelineError> {
        self.run_with_id(Uuid::new_v4(), date).await
    }

    #[instrument(skip(self, date), fields(birth_date = %date))]
    pub async fn run_with_id(
        &self,
        run_id: Uuid,
        date: &BirthDate,
    ) -> Result<FinalReport, PipelineError> {
        info!("Starting report pipeline");
        let started = Instant::now();

        let result = self.run_stages(run_id, date).await;
        self.metrics.record_run(result.is_ok());

        match &result {
            Ok(report) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                records = report.success_table.len(),
                "Report pipeline finished"
            ),
            Err(e) => error!(stage = %e.stage(), "Report pipeline aborted: {}", e),
        }
        result
    }

    async fn run_stages(&self, run_id: Uuid, date: &BirthDate) -> Result<FinalReport, PipelineError> {
        let invoker = &self.invoker;

        let analysis = self
            .stage(
                Stage::Analyzer,
                self.analyzer.analyze(invoker, run_id, date),
            )
            .await?;

        let improvement = self
            .stage(
                Stage::Improvement,
                self.improver.improve(invoker, run_id, date, &analysis),
            )
            .await?;

        let success_table = self
            .stage(
                Stage::SuccessSearch,
                self.success_searcher.search(invoker, run_id, date),
            )
            .await?;

        let content = self
            .stage(
                Stage::Report,
                self.reporter
                    .compose(invoker, run_id, date, &analysis, &improvement, &success_table),
            )
            .await?;

        Ok(FinalReport {
            run_id,
            birth_date: date.clone(),
            content,
            success_table,
        })
    }

    async fn stage<T, F>(&self, stage: Stage, work: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, AgentError>>,
    {
        info!(stage = %stage, "Stage started");
        let started = Instant::now();

        let outcome = match tokio::time::timeout(self.stage_timeout, work).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(PipelineError::Stage { stage, source }),
            Err(_) => Err(PipelineError::Timeout {
                stage,
                secs: self.stage_timeout.as_secs(),
            }),
        };

        let elapsed = started.elapsed();
        self.metrics
            .observe_stage(stage.as_str(), outcome.is_ok(), elapsed);

        match &outcome {
            Ok(_) => info!(stage = %stage, elapsed_ms = elapsed.as_millis() as u64, "Stage finished"),
            Err(e) => error!(stage = %stage, "Stage failed: {}", e),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name() {
        let date = BirthDate::parse("07/03/2001").unwrap();
        assert_eq!(report_file_name(&date), "relatorio_personalidade_07-03-2001.md");
    }

    #[test]
    fn test_document_normalizes_bullets() {
        let report = FinalReport {
            run_id: Uuid::new_v4(),
            birth_date: BirthDate::parse("07/03/2001").unwrap(),
            content: "# Título\n• um\n• dois\n".to_string(),
            success_table: SuccessTable::default(),
        };
        assert_eq!(report.document(), "# Título\n* um\n* dois\n");
        assert_eq!(report.file_name(), "relatorio_personalidade_07-03-2001.md");
    }

    #[test]
    fn test_error_reports_stage() {
        let err = PipelineError::Timeout {
            stage: Stage::SuccessSearch,
            secs: 5,
        };
        assert_eq!(err.stage(), Stage::SuccessSearch);
        assert_eq!(err.to_string(), "success_search stage timed out after 5s");
    }
}
