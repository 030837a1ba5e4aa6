use warp::{Filter, Rejection, Reply};
use crate::error::{handle_rejection, ApiError};
use crate::metrics::Metrics;
use crate::middleware;
use crate::pipeline::Pipeline;
use std::sync::Arc;

mod page;
mod report;

/// Every route the service exposes, with logging, CORS and error recovery.
pub fn app(
    pipeline: Arc<Pipeline>,
    metrics: Metrics,
    cors_origin: Option<&str>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let api_routes = routes(pipeline)
        .with(warp::log("api"))
        .with(middleware::cors(cors_origin));

    page::index()
        .or(health())
        .or(metrics_route(metrics))
        .or(api_routes)
        .recover(handle_rejection)
}

pub fn routes(
    pipeline: Arc<Pipeline>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    let report_route = api
        .and(warp::path("report"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json())
        .and(with_pipeline(pipeline))
        .and_then(report::handle_report);

    let export_route = api
        .and(warp::path!("report" / "export"))
        .and(warp::post())
        .and(warp::body::content_length_limit(4 * 1024 * 1024))
        .and(warp::body::json())
        .and_then(report::handle_export);

    report_route.or(export_route)
}

pub fn health() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})))
}

pub fn metrics_route(
    metrics: Metrics,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || metrics.clone()))
        .and_then(|metrics: Metrics| async move {
            let (buffer, content_type) = metrics
                .encode()
                .map_err(|e| warp::reject::custom(ApiError::InternalError(e.to_string())))?;
            Ok::<_, Rejection>(warp::reply::with_header(buffer, "Content-Type", content_type))
        })
}

fn with_pipeline(
    pipeline: Arc<Pipeline>,
) -> impl Filter<Extract = (Arc<Pipeline>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || pipeline.clone())
}
