use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gremlin_pg::SqlBackend;
use gremlin_send::{SendRequest, forward_url};
use tracing::debug;

use super::json_body;
use crate::{error::ApiError, state::ApiState};

fn upstream_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// GET /http-send/send/{*target}
///
/// Forwards `GET http://<target>?<query>` and replies with the full send result.
pub(crate) async fn forward<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    Path(target): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let req = SendRequest {
        url: forward_url(&target, query.as_deref()),
        method: "GET".into(),
        headers: Default::default(),
        body: None,
    };
    debug!(target: "gremlin.api.send", url = %req.url, "forwarding");
    let result = state.sender.send(&req).await?;
    Ok((upstream_status(result.status_code), Json(result)).into_response())
}

/// POST /http-send/send
///
/// Sends the described request and replies with the upstream status and body.
pub(crate) async fn send<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: SendRequest = json_body(&body)?;
    let result = state.sender.send(&req).await?;
    Ok((upstream_status(result.status_code), Json(result.body)).into_response())
}
