use warp::{Rejection, Reply};
use crate::birth_date::BirthDate;
use crate::error::ApiError;
use crate::models::{ExportRequest, ReportRequest, ReportResponse};
use crate::pipeline::{normalize_bullets, report_file_name, Pipeline};
use std::sync::Arc;
use tracing::info;

fn parse_date(input: &str) -> Result<BirthDate, Rejection> {
    BirthDate::parse(input).map_err(|e| warp::reject::custom(ApiError::from(e)))
}

pub async fn handle_report(
    request: ReportRequest,
    pipeline: Arc<Pipeline>,
) -> Result<impl Reply, Rejection> {
    // Validation happens before any agent is invoked.
    let date = parse_date(&request.birth_date)?;
    info!("Generating report for birth date {}", date);

    // The run gets its own task so a client that goes away does not cancel
    // provider calls already in flight; the result is then simply dropped.
    let run_date = date.clone();
    let report = tokio::spawn(async move { pipeline.run(&run_date).await })
        .await
        .map_err(|e| warp::reject::custom(ApiError::InternalError(e.to_string())))?
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    let response = ReportResponse {
        run_id: report.run_id,
        birth_date: date.as_str().to_string(),
        report_markdown: report.document(),
        file_name: report.file_name(),
        success_table: report.success_table.into_records(),
    };

    Ok(warp::reply::json(&response))
}

/// Returns the report text as a markdown attachment named after the birth date.
pub async fn handle_export(request: ExportRequest) -> Result<impl Reply, Rejection> {
    let date = parse_date(&request.birth_date)?;
    let file_name = report_file_name(&date);
    info!("Exporting report as {}", file_name);

    let reply = warp::reply::with_header(
        normalize_bullets(&request.content),
        "Content-Type",
        "text/markdown; charset=utf-8",
    );
    Ok(warp::reply::with_header(
        reply,
        "Content-Disposition",
        format!("attachment; filename=\"{}\"", file_name),
    ))
}
