use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndarray::ShapeError;
use serde_json::json;
use thiserror::Error;

use crate::config::Route;

/// Coarse classification used for status codes, logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad client input; the model was never invoked.
    Validation,
    /// A model or scaler failed while serving a request.
    Inference,
    /// Artifact or wiring problem found before serving.
    Startup,
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Invalid value for field `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid request body: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error("Model not found at path: {0}")]
    ModelNotFound(String),

    #[error("Unsupported artifact format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read artifact {path}: {source}")]
    ArtifactRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    ArtifactParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact {path} is not a {expected}")]
    WrongArtifactKind { path: String, expected: &'static str },

    #[error("No pipeline configured for route {0}")]
    PipelineMissing(Route),

    #[error("Route {0} requires a scaler artifact")]
    ScalerMissing(Route),

    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Input shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Shape error: {0}")]
    ShapeError(#[from] ShapeError),

    #[error("Model returned no output")]
    EmptyOutput,

    #[error("Model returned a non-finite value: {0}")]
    NonFiniteOutput(f64),

    #[error("Model session lock poisoned")]
    SessionPoisoned,
}

impl PredictError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::Validation { .. } | PredictError::InvalidBody(_) => ErrorKind::Validation,
            PredictError::ModelNotFound(_)
            | PredictError::UnsupportedFormat(_)
            | PredictError::ArtifactRead { .. }
            | PredictError::ArtifactParse { .. }
            | PredictError::WrongArtifactKind { .. }
            | PredictError::PipelineMissing(_)
            | PredictError::ScalerMissing(_) => ErrorKind::Startup,
            PredictError::OrtError(_)
            | PredictError::ShapeMismatch { .. }
            | PredictError::ShapeError(_)
            | PredictError::EmptyOutput
            | PredictError::NonFiniteOutput(_)
            | PredictError::SessionPoisoned => ErrorKind::Inference,
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            PredictError::Validation { field, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": self.to_string(), "field": field }),
            ),
            PredictError::InvalidBody(rejection) => {
                (rejection.status(), json!({ "error": self.to_string() }))
            }
            PredictError::ShapeMismatch { .. }
            | PredictError::EmptyOutput
            | PredictError::NonFiniteOutput(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found_error() {
        let error = PredictError::ModelNotFound("models/ars.json".to_string());
        assert_eq!(error.to_string(), "Model not found at path: models/ars.json");
        assert_eq!(error.kind(), ErrorKind::Startup);
    }

    #[test]
    fn test_validation_error_message() {
        let error = PredictError::validation("fatigue_score", "must be between 0 and 10, got 11");
        assert_eq!(
            error.to_string(),
            "Invalid value for field `fatigue_score`: must be between 0 and 10, got 11"
        );
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_shape_mismatch_error() {
        let error = PredictError::ShapeMismatch {
            expected: vec![1, 3],
            got: vec![1, 5],
        };
        assert_eq!(
            error.to_string(),
            "Input shape mismatch: expected [1, 3], got [1, 5]"
        );
        assert_eq!(error.kind(), ErrorKind::Inference);
    }

    #[test]
    fn test_shape_error_conversion() {
        let shape_error = ShapeError::from_kind(ndarray::ErrorKind::OutOfBounds);
        match PredictError::from(shape_error) {
            PredictError::ShapeError(_) => {}
            other => panic!("Expected ShapeError, got {other:?}"),
        }
    }

    #[test]
    fn test_into_response_validation() {
        let response = PredictError::validation("sleep_hours", "must be a finite number")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_into_response_inference_is_server_error() {
        let response = PredictError::ShapeMismatch {
            expected: vec![1, 3],
            got: vec![1, 5],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = PredictError::EmptyOutput.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_startup_errors_hide_detail() {
        let response = PredictError::PipelineMissing(Route::AclRisk).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
