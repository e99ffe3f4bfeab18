use axum::{
    Router,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use gremlin_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
use tracing::error;

/// `GET /metrics` in the Prometheus text exposition format.
pub fn router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route("/metrics", get(render))
        .with_state(metrics)
}

async fn render(State(metrics): State<PrometheusMetrics>) -> Response {
    match metrics.render() {
        Ok(body) => {
            let content_type = TextEncoder::new().format_type().to_string();
            ([(CONTENT_TYPE, content_type)], body).into_response()
        }
        Err(e) => {
            error!(target: "gremlin.agentd", error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
