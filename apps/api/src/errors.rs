use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Failures of the extraction-and-scoring pipeline.
///
/// Every variant is surfaced to the caller; none of them is ever turned into an
/// empty criteria list or an empty score row.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported file format: {0}. Please upload a PDF or DOCX.")]
    UnsupportedFormat(String),

    #[error("Could not read document: {0}")]
    ParseFailure(String),

    #[error("No criteria found. Please extract criteria first.")]
    CriteriaNotSet,

    #[error("Language model call failed: {0}")]
    Upstream(String),

    #[error("No JSON object found in the model reply")]
    NoJsonFound,

    #[error("Model reply is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("Model reply is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("Model reply has an unexpected shape: {0}")]
    InvalidShape(String),

    #[error("total_score '{value}' for candidate '{candidate}' is not a number")]
    InvalidScore { candidate: String, value: String },
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        PipelineError::Upstream(err.to_string())
    }
}

/// Who has to act on a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller sent something unusable; fix the input.
    Input,
    /// The upload could not be decoded. Caused by the input, reported as a server error.
    UnreadableDocument,
    /// The upstream service failed; the same request may succeed later.
    Retryable,
    /// The model ignored the requested output contract.
    ModelContract,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::UnsupportedFormat(_) | PipelineError::CriteriaNotSet => {
                FailureKind::Input
            }
            PipelineError::ParseFailure(_) => FailureKind::UnreadableDocument,
            PipelineError::Upstream(_) => FailureKind::Retryable,
            PipelineError::NoJsonFound
            | PipelineError::MalformedJson(_)
            | PipelineError::MissingField(_)
            | PipelineError::InvalidShape(_)
            | PipelineError::InvalidScore { .. } => FailureKind::ModelContract,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PipelineError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            PipelineError::ParseFailure(_) => "PARSE_FAILURE",
            PipelineError::CriteriaNotSet => "CRITERIA_NOT_SET",
            PipelineError::Upstream(_) => "UPSTREAM_ERROR",
            PipelineError::NoJsonFound => "NO_JSON_FOUND",
            PipelineError::MalformedJson(_) => "MALFORMED_JSON",
            PipelineError::MissingField(_) => "MISSING_FIELD",
            PipelineError::InvalidShape(_) => "INVALID_SHAPE",
            PipelineError::InvalidScore { .. } => "INVALID_SCORE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            PipelineError::UnsupportedFormat(_) | PipelineError::CriteriaNotSet => {
                StatusCode::BAD_REQUEST
            }
            PipelineError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Error scoring resume {file}: {source}")]
    ResumeFailed {
        file: String,
        #[source]
        source: PipelineError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(e) => (e.status(), e.code(), e.to_string()),
            AppError::ResumeFailed { source, .. } => {
                (source.status(), source.code(), self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        if status.is_server_error() {
            tracing::error!("{code}: {message}");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
