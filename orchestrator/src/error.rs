use crate::birth_date::BirthDateError;
use crate::pipeline::PipelineError;
use thiserror::Error;
use tracing::error;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid birth date: {0}")]
    InvalidBirthDate(#[from] BirthDateError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl Reject for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBirthDate(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Pipeline(PipelineError::Stage { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The single message shown to the person using the page.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidBirthDate(BirthDateError::Empty) => {
                "Por favor, digite sua data de nascimento.".to_string()
            }
            ApiError::InvalidBirthDate(BirthDateError::Format(_)) => {
                "Formato de data incorreto. Por favor, use o formato DD/MM/AAAA.".to_string()
            }
            ApiError::Pipeline(e) => format!("Ocorreu um erro durante a análise: {}", e),
            ApiError::InternalError(_) => "Erro interno do servidor.".to_string(),
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    let (code, message, details) = if let Some(api_err) = err.find::<ApiError>() {
        if api_err.status().is_server_error() {
            error!("Request failed: {}", api_err);
        }
        (api_err.status(), api_err.user_message(), api_err.to_string())
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            "Requisição inválida.".to_string(),
            body_err.to_string(),
        )
    } else {
        return Err(err);
    };

    let json = warp::reply::json(&serde_json::json!({
        "error": message,
        "details": details,
    }));

    Ok(warp::reply::with_status(json, code))
}
