use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::validation::ValidationError;
use crate::workflows::verification::gateway::RemoteFailure;
use crate::workflows::verification::queue::AggregationFailure;
use crate::workflows::verification::transition::TransitionError;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Validation(ValidationError),
    Queue(AggregationFailure),
    Transition(TransitionError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(error) => validation_status(error),
            AppError::Queue(AggregationFailure::Validation(error)) => validation_status(error),
            AppError::Queue(_) => StatusCode::BAD_GATEWAY,
            AppError::Transition(TransitionError::Validation(error)) => validation_status(error),
            AppError::Transition(TransitionError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::Transition(TransitionError::Remote(failure)) => remote_status(failure),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Malformed input is a 400; well-formed input the workflow refuses is a 422.
fn validation_status(error: &ValidationError) -> StatusCode {
    match error {
        ValidationError::UnknownKind(_)
        | ValidationError::UnknownAction(_)
        | ValidationError::InvalidField { .. }
        | ValidationError::InvalidPage
        | ValidationError::InvalidPageSize { .. } => StatusCode::BAD_REQUEST,
        ValidationError::MissingReason { .. }
        | ValidationError::MissingAction
        | ValidationError::EmptyTargets
        | ValidationError::MissingField { .. }
        | ValidationError::KindMismatch { .. }
        | ValidationError::ExcludedKind { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn remote_status(failure: &RemoteFailure) -> StatusCode {
    match failure {
        RemoteFailure::NotFound => StatusCode::NOT_FOUND,
        RemoteFailure::Conflict(_) => StatusCode::CONFLICT,
        RemoteFailure::Unauthorized(_) => StatusCode::FORBIDDEN,
        RemoteFailure::Transport(_) | RemoteFailure::Rejected(_) => StatusCode::BAD_GATEWAY,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::Queue(err) => write!(f, "{}", err),
            AppError::Transition(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Queue(err) => Some(err),
            AppError::Transition(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AggregationFailure> for AppError {
    fn from(value: AggregationFailure) -> Self {
        Self::Queue(value)
    }
}

impl From<TransitionError> for AppError {
    fn from(value: TransitionError) -> Self {
        Self::Transition(value)
    }
}
