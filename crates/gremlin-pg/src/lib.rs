//! Ad-hoc SQL proxy against caller-supplied or stored PostgreSQL connection strings.
//!
//! [`ConnectionManager`] resolves the connection string (inline or from the
//! [`ConnectionStore`]), opens a fresh session through a [`SqlBackend`] and runs the query.
//! [`PgBackend`] is the sqlx implementation used in production.
mod errors;
pub use errors::PgError;

mod store;
pub use store::ConnectionStore;

mod backend;
pub use backend::{PgBackend, SqlBackend, SqlRow, SqlSession};

mod manager;
pub use manager::{
    ConnectRequest, ConnectResult, ConnectionManager, QueryRequest, QueryResult,
    StoreConnectionResult,
};
