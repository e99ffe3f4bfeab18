use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gremlin_about::AboutError;
use gremlin_load::LoadError;
use gremlin_pg::PgError;
use gremlin_send::SendError;
use thiserror::Error;
use tracing::error;

/// Non-standard "client closed request" status.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Postgres(#[from] PgError),

    #[error("{0}")]
    Send(#[from] SendError),

    #[error("{0}")]
    About(#[from] AboutError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Load(LoadError::Validation { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Load(LoadError::Cancelled { .. }) => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST)
            }
            ApiError::Postgres(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Postgres(PgError::ConnectionFailed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(target: "gremlin.api", error = %self, "request failed");
        }
        let body = match &self {
            ApiError::Load(e @ LoadError::Cancelled { .. }) => format!("request cancelled: {e}"),
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
