use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    extract::{Query, State},
};
use gremlin_load::{LoadRequest, LoadResult};
use gremlin_pg::SqlBackend;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::{
    error::ApiError,
    params::{self, parse_count, parse_duration, parse_reclaim, parse_size, parse_tasks},
    state::ApiState,
};

#[derive(Debug, Serialize)]
pub(crate) struct LoadResponse {
    tasks_started: usize,
    duration: String,
    error: String,
}

impl LoadResponse {
    fn new(result: LoadResult, duration: Duration) -> Self {
        Self {
            tasks_started: result.tasks_started,
            duration: format!("{}ms", duration.as_millis()),
            error: result.error.unwrap_or_default(),
        }
    }
}

impl From<LoadResult> for LoadResponse {
    fn from(result: LoadResult) -> Self {
        let duration = result.duration;
        Self::new(result, duration)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CpuParams {
    tasks: Option<String>,
    timeout: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemoryParams {
    size: Option<String>,
    gc_after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IoParams {
    tasks: Option<String>,
    wait: Option<String>,
    parallel: Option<String>,
}

/// GET /load/cpu?tasks=&timeout=
///
/// Reported duration is the wall time of the whole call.
pub(crate) async fn cpu<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    Query(p): Query<CpuParams>,
) -> Result<Json<LoadResponse>, ApiError> {
    let timeout = params::required(p.timeout.as_deref(), "timeout", parse_duration)?;
    let tasks = parse_tasks(p.tasks.as_deref().unwrap_or_default())
        .ok_or_else(|| params::invalid_format("tasks"))?;

    let (token, _guard) = state.request_token();
    let started = Instant::now();
    let result = state
        .coordinator
        .cpu(&token, tasks, timeout.clamped())
        .await?;
    let elapsed = started.elapsed();
    debug!(target: "gremlin.api.load", tasks, ?elapsed, "cpu load finished");
    Ok(Json(LoadResponse::new(result, elapsed)))
}

/// GET /load/memory?size=&gc_after=
pub(crate) async fn memory<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    Query(p): Query<MemoryParams>,
) -> Result<Json<LoadResponse>, ApiError> {
    let size = params::required(p.size.as_deref(), "size", parse_size)?;
    let reclaim = parse_reclaim(p.gc_after.as_deref())?;

    let (token, _guard) = state.request_token();
    let result = state
        .coordinator
        .run(LoadRequest::Memory { size, reclaim }, &token)
        .await?;
    debug!(target: "gremlin.api.load", size, ?reclaim, "memory load finished");
    Ok(Json(result.into()))
}

/// GET /load/io?tasks=&wait=&parallel=
pub(crate) async fn io<B: SqlBackend>(
    State(state): State<Arc<ApiState<B>>>,
    Query(p): Query<IoParams>,
) -> Result<Json<LoadResponse>, ApiError> {
    let (Some(tasks), Some(wait), Some(parallel)) = (
        p.tasks.as_deref().filter(|v| !v.is_empty()),
        p.wait.as_deref().filter(|v| !v.is_empty()),
        p.parallel.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::InvalidRequest(
            "tasks, wait, and parallel parameters are required".into(),
        ));
    };
    let tasks = parse_count(tasks).ok_or_else(|| params::invalid_format("tasks"))?;
    let wait = parse_duration(wait).ok_or_else(|| params::invalid_format("wait"))?;
    let parallel = parse_count(parallel).ok_or_else(|| params::invalid_format("parallel"))?;

    let (token, _guard) = state.request_token();
    let result = state
        .coordinator
        .io(&token, tasks, wait.clamped(), parallel)
        .await?;
    debug!(target: "gremlin.api.load", tasks, parallel, "io load finished");
    Ok(Json(result.into()))
}
