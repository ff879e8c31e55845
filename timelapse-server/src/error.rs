use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use timelapse_core::{RouteId, StopId};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unknown stop {0}")]
    UnknownStop(StopId),
    #[error("unknown route {0}")]
    UnknownRoute(RouteId),
    #[error("no path from {from} to {to}")]
    NoPath { from: StopId, to: StopId },
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Core(#[from] timelapse_core::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownStop(_) | ApiError::UnknownRoute(_) | ApiError::NoPath { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
