//! Integration tests for the four-stage pipeline with a scripted provider.

mod common;

use common::{pipeline, pipeline_with_timeout, StubProvider, FAST_MODEL, ROBUST_MODEL};
use purpose_orchestrator::agents::{
    AgentError, ANALYZER_AGENT, IMPROVER_AGENT, REPORTER_AGENT, SUCCESS_SEARCHER_AGENT,
};
use purpose_orchestrator::{BirthDate, PipelineError, Stage, SuccessPersonRecord};
use std::sync::Arc;
use std::time::Duration;

fn date() -> BirthDate {
    BirthDate::parse("15/08/1990").unwrap()
}

/// Test: stubbed stages produce the stage-4 output and a one-record table
#[tokio::test]
async fn test_happy_path() {
    let provider = Arc::new(StubProvider::happy_path());
    let (pipeline, metrics) = pipeline(provider.clone());

    let report = pipeline.run(&date()).await.expect("pipeline failed");

    // Final text is the reporter's output (fragments always end in a newline)
    assert_eq!(report.content, "R\n");
    assert_eq!(report.document(), "R\n");
    assert_eq!(report.file_name(), "relatorio_personalidade_15-08-1990.md");
    assert_eq!(
        report.success_table.records(),
        &[SuccessPersonRecord::new("X", "Y", "Z", "W")]
    );

    assert_eq!(
        provider.agents_called(),
        vec![ANALYZER_AGENT, IMPROVER_AGENT, SUCCESS_SEARCHER_AGENT, REPORTER_AGENT]
    );
    assert_eq!(metrics.run_count(true), 1);
    assert_eq!(metrics.stage_count("report", true), 1);
    assert_eq!(pipeline.invoker().conversations().live_count(), 0);
}

/// Test: each prompt embeds exactly the upstream text it depends on
#[tokio::test]
async fn test_outputs_thread_into_later_prompts() {
    let provider = Arc::new(StubProvider::happy_path());
    let (pipeline, _) = pipeline(provider.clone());
    pipeline.run(&date()).await.expect("pipeline failed");

    let calls = provider.calls();

    assert!(calls[0].request.contains("15/08/1990"));
    assert!(calls[1].request.contains("---\nA\n\n---"));
    assert!(calls[2].request.contains("15/08/1990"));
    assert!(!calls[2].request.contains("---\nA\n"));

    let report_request = &calls[3].request;
    assert!(report_request.contains("---\nA\n\n---"));
    assert!(report_request.contains("---\nB\n\n---"));
    assert!(report_request.contains("| X | Y | Z | W |"));
}

/// Test: model tiers and search capability per stage
#[tokio::test]
async fn test_stage_agent_configuration() {
    let provider = Arc::new(StubProvider::happy_path());
    let (pipeline, _) = pipeline(provider.clone());
    pipeline.run(&date()).await.expect("pipeline failed");

    let calls = provider.calls();
    let summary: Vec<(&str, &str, bool)> = calls
        .iter()
        .map(|c| (c.agent.as_str(), c.model.as_str(), c.web_search))
        .collect();

    assert_eq!(
        summary,
        vec![
            (ANALYZER_AGENT, FAST_MODEL, true),
            (IMPROVER_AGENT, FAST_MODEL, false),
            (SUCCESS_SEARCHER_AGENT, ROBUST_MODEL, true),
            (REPORTER_AGENT, FAST_MODEL, false),
        ]
    );
}

/// Test: every stage of one run shares the run id; runs never share it
#[tokio::test]
async fn test_conversations_are_scoped_to_the_run() {
    let provider = Arc::new(StubProvider::happy_path());
    let (pipeline, _) = pipeline(provider.clone());

    let date = date();
    let (first, second) = tokio::join!(pipeline.run(&date), pipeline.run(&date));
    let first = first.expect("first run failed");
    let second = second.expect("second run failed");
    assert_ne!(first.run_id, second.run_id);

    let calls = provider.calls();
    assert_eq!(calls.len(), 8);
    for run in [first.run_id, second.run_id] {
        let prefix = format!("{}:", run);
        let count = calls
            .iter()
            .filter(|c| c.conversation_id.starts_with(&prefix))
            .count();
        assert_eq!(count, 4, "run {} should own four conversations", run);
    }
    assert!(calls
        .iter()
        .any(|c| c.conversation_id == format!("{}:{}", first.run_id, REPORTER_AGENT)));
}

/// Test: a failing first stage stops the run before any other invocation
#[tokio::test]
async fn test_first_stage_failure_aborts_run() {
    let provider = Arc::new(StubProvider::happy_path().fail(ANALYZER_AGENT, "boom"));
    let (pipeline, metrics) = pipeline(provider.clone());

    let err = pipeline.run(&date()).await.unwrap_err();

    assert_eq!(err.stage(), Stage::Analyzer);
    assert!(matches!(
        err,
        PipelineError::Stage {
            source: AgentError::Provider(_),
            ..
        }
    ));
    assert_eq!(provider.agents_called(), vec![ANALYZER_AGENT]);
    assert_eq!(metrics.run_count(false), 1);
    assert_eq!(metrics.run_count(true), 0);
    assert_eq!(pipeline.invoker().conversations().live_count(), 0);
}

/// Test: a failing search stage never reaches the reporter
#[tokio::test]
async fn test_search_failure_skips_report() {
    let provider = Arc::new(StubProvider::happy_path().fail(SUCCESS_SEARCHER_AGENT, "quota"));
    let (pipeline, _) = pipeline(provider.clone());

    let err = pipeline.run(&date()).await.unwrap_err();

    assert_eq!(err.stage(), Stage::SuccessSearch);
    assert!(err.to_string().contains("quota"));
    assert_eq!(
        provider.agents_called(),
        vec![ANALYZER_AGENT, IMPROVER_AGENT, SUCCESS_SEARCHER_AGENT]
    );
}

/// Test: unparseable search output degrades to an empty table
#[tokio::test]
async fn test_empty_table_is_not_an_error() {
    let provider = Arc::new(
        StubProvider::happy_path()
            .reply(SUCCESS_SEARCHER_AGENT, "Não encontrei ninguém nascido nessa data."),
    );
    let (pipeline, _) = pipeline(provider.clone());

    let report = pipeline.run(&date()).await.expect("pipeline failed");

    assert!(report.success_table.is_empty());
    assert_eq!(report.content, "R\n");
    let report_request = &provider.calls()[3].request;
    assert!(report_request.contains("| Nome | Profissão | Sucesso | Site da Informação |"));
}

/// Test: a stage that never answers is cut off by the stage timeout
#[tokio::test]
async fn test_stage_timeout() {
    let provider = Arc::new(StubProvider::happy_path().hang(IMPROVER_AGENT));
    let (pipeline, metrics) = pipeline_with_timeout(provider.clone(), Duration::from_millis(50));

    let err = pipeline.run(&date()).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Timeout {
            stage: Stage::Improvement,
            ..
        }
    ));
    assert_eq!(provider.agents_called(), vec![ANALYZER_AGENT, IMPROVER_AGENT]);
    assert_eq!(metrics.stage_count("improvement", false), 1);
    assert_eq!(pipeline.invoker().conversations().live_count(), 0);
}
