use axum::Json;
use gremlin_about::{NetworkInfo, SystemInfo};

use crate::error::ApiError;

/// GET /about/system
///
/// Reading procfs blocks, so the report is built on the blocking pool.
pub(crate) async fn system() -> Result<Json<SystemInfo>, ApiError> {
    let info = tokio::task::spawn_blocking(gremlin_about::system_info).await??;
    Ok(Json(info))
}

/// GET /about/network
pub(crate) async fn network() -> Result<Json<NetworkInfo>, ApiError> {
    let info = tokio::task::spawn_blocking(gremlin_about::network_info).await?;
    Ok(Json(info))
}
