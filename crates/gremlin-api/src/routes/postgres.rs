use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use gremlin_pg::{
    ConnectRequest, ConnectResult, QueryRequest, QueryResult, SqlBackend, StoreConnectionResult,
};
use serde::Deserialize;

use super::json_body;
use crate::{error::ApiError, state::ApiState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreRequest {
    #[serde(default)]
    connection_string: String,
}

/// PUT /postgresql/connection-string
pub(crate) async fn store<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    body: Bytes,
) -> Result<Json<StoreConnectionResult>, ApiError> {
    let req: StoreRequest = json_body(&body)?;
    Ok(Json(
        state.postgres.store_connection_string(req.connection_string),
    ))
}

/// POST /postgresql/connect
pub(crate) async fn connect<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    body: Bytes,
) -> Result<Json<ConnectResult>, ApiError> {
    let req: ConnectRequest = json_body(&body)?;
    Ok(Json(state.postgres.connect(&req).await?))
}

/// POST /postgresql/query
pub(crate) async fn query<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    body: Bytes,
) -> Result<Json<QueryResult>, ApiError> {
    let req: QueryRequest = json_body(&body)?;
    Ok(Json(state.postgres.execute_query(&req).await?))
}
