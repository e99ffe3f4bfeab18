//! HTTP surface of the load generator.
//!
//! [`HttpApi`] mounts every route on an [`axum::Router`] over a shared [`ApiState`]:
//! - `/load/{cpu,memory,io}` drive the [`gremlin_load::LoadCoordinator`]
//! - `/echo/{get,post}` reflect the inbound request
//! - `/about/{system,network}` report host facts
//! - `/http-send/send` forwards requests upstream
//! - `/postgresql/*` proxy ad-hoc SQL
mod error;
pub use error::ApiError;

mod params;
pub use params::parse_go_duration;

mod state;
pub use state::ApiState;

mod routes;

mod http;
pub use http::HttpApi;

pub use axum;
