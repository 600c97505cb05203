use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use tracing::{error, warn};

use crate::deposit_service::DepositServiceError;

/// Errors of the HTTP API handlers.
#[derive(Debug)]
pub enum AppError {
    /// The request body is not a JSON deposit list.
    InvalidJson(serde_json::Error),

    /// A required query parameter is missing or empty.
    MissingParameter(&'static str),

    /// The deposit service rejected the request.
    Processing(DepositServiceError),

    /// Catching anyhow errors
    Internal(anyhow::Error),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::InvalidJson(err) => (
                StatusCode::BAD_REQUEST,
                format!("400 error reading JSON message: {err}"),
            ),
            Self::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                format!("400 error processing data: missing parameter '{name}'"),
            ),
            Self::Processing(err) => (
                StatusCode::BAD_REQUEST,
                format!("400 error processing data: {err}"),
            ),
            Self::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("500 {err}")),
        }
    }
}

/// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response<Body> {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("{message}");
        } else {
            warn!("{message}");
        }

        (status, format!("{message}\n")).into_response()
    }
}

/// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
/// `Result<_, AppError>`. That way you don't need to do that manually.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
