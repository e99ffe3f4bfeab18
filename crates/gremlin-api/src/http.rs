use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use gremlin_pg::{PgBackend, SqlBackend};

use crate::{
    routes::{about, echo, load, postgres, send},
    state::ApiState,
};

/// HTTP API service builder.
pub struct HttpApi<B = PgBackend> {
    state: Arc<ApiState<B>>,
}

impl<B: SqlBackend> HttpApi<B> {
    pub fn new(state: Arc<ApiState<B>>) -> Self {
        Self { state }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET /load/cpu, /load/memory, /load/io
    /// - GET /echo/get, POST /echo/post
    /// - GET /about/system, /about/network
    /// - GET /http-send/send/{*target}, POST /http-send/send
    /// - PUT /postgresql/connection-string, POST /postgresql/connect, POST /postgresql/query
    pub fn router(self) -> Router {
        Router::new()
            .route("/load/cpu", get(load::cpu::<B>))
            .route("/load/memory", get(load::memory::<B>))
            .route("/load/io", get(load::io::<B>))
            .route("/echo/get", get(echo::get))
            .route("/echo/post", post(echo::post))
            .route("/about/system", get(about::system))
            .route("/about/network", get(about::network))
            .route("/http-send/send", post(send::send::<B>))
            .route("/http-send/send/{*target}", get(send::forward::<B>))
            .route("/postgresql/connection-string", put(postgres::store::<B>))
            .route("/postgresql/connect", post(postgres::connect::<B>))
            .route("/postgresql/query", post(postgres::query::<B>))
            .with_state(self.state)
    }
}
