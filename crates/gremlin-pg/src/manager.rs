use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, instrument, warn};

use crate::{
    backend::{PgBackend, SqlBackend, SqlRow, SqlSession},
    errors::PgError,
    store::ConnectionStore,
};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(default)]
    pub connection_string: String,
    #[serde(default)]
    pub connection_string_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub connection_string: String,
    #[serde(default)]
    pub connection_string_id: String,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreConnectionResult {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rows of a finished statement, or the SQL error it produced.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub rows: Vec<SqlRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Statement execution time, excluding connection setup.
    #[serde(serialize_with = "millis")]
    pub time: Duration,
}

fn millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{}ms", d.as_millis()))
}

/// Resolves connection strings and runs one-shot sessions against them.
///
/// Every call opens a fresh session and closes it before returning; nothing is pooled.
pub struct ConnectionManager<B = PgBackend> {
    store: Arc<ConnectionStore>,
    backend: B,
    connect_timeout: Duration,
    ping_timeout: Duration,
}

impl ConnectionManager<PgBackend> {
    pub fn new(store: Arc<ConnectionStore>) -> Self {
        Self::with_backend(store, PgBackend)
    }
}

impl<B: SqlBackend> ConnectionManager<B> {
    pub fn with_backend(store: Arc<ConnectionStore>, backend: B) -> Self {
        Self {
            store,
            backend,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }

    /// Bound on session setup for [`connect`](Self::connect).
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound on session setup before [`execute_query`](Self::execute_query) runs the statement.
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn store_connection_string(&self, dsn: impl Into<String>) -> StoreConnectionResult {
        StoreConnectionResult {
            id: self.store.insert(dsn),
        }
    }

    /// Checks reachability. An unreachable server is reported in the result, not as an error.
    #[instrument(level = "debug", skip_all, fields(by_id = !req.connection_string_id.is_empty()))]
    pub async fn connect(&self, req: &ConnectRequest) -> Result<ConnectResult, PgError> {
        let dsn = self.resolve(&req.connection_string, &req.connection_string_id)?;
        match self.open(&dsn, self.connect_timeout).await {
            Ok(session) => {
                session.close().await;
                Ok(ConnectResult {
                    success: true,
                    error: None,
                })
            }
            Err(e @ PgError::ConnectionFailed(_)) => {
                debug!(target: "gremlin.pg", error = %e, "database unreachable");
                Ok(ConnectResult {
                    success: false,
                    error: Some(e.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Runs `req.query`. SQL errors land in [`QueryResult::error`]; connection problems are errors.
    #[instrument(level = "debug", skip_all, fields(by_id = !req.connection_string_id.is_empty()))]
    pub async fn execute_query(&self, req: &QueryRequest) -> Result<QueryResult, PgError> {
        let dsn = self.resolve(&req.connection_string, &req.connection_string_id)?;
        let mut session = self.open(&dsn, self.ping_timeout).await?;

        let started = Instant::now();
        let outcome = session.query(&req.query).await;
        let time = started.elapsed();
        session.close().await;

        Ok(match outcome {
            Ok(rows) => QueryResult {
                rows,
                error: None,
                time,
            },
            Err(error) => {
                warn!(target: "gremlin.pg", %error, "query failed");
                QueryResult {
                    rows: Vec::new(),
                    error: Some(error),
                    time,
                }
            }
        })
    }

    fn resolve(&self, dsn: &str, id: &str) -> Result<String, PgError> {
        match (dsn.is_empty(), id.is_empty()) {
            (false, false) => Err(PgError::BothInputsProvided),
            (true, true) => Err(PgError::NeitherInputProvided),
            (false, true) => Ok(dsn.to_string()),
            (true, false) => self
                .store
                .get(id)
                .ok_or_else(|| PgError::ConnIdNotFound(id.to_string())),
        }
    }

    /// Connects and pings within `timeout`.
    async fn open(&self, dsn: &str, timeout: Duration) -> Result<Box<dyn SqlSession>, PgError> {
        let attempt = async {
            let mut session = self.backend.connect(dsn).await?;
            session.ping().await.map_err(PgError::ConnectionFailed)?;
            Ok::<_, PgError>(session)
        };
        match tokio::time::timeout(timeout, attempt).await {
            Ok(opened) => opened,
            Err(_) => Err(PgError::ConnectionFailed(format!(
                "timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Default)]
    struct FakeBackend {
        unreachable: bool,
        hang: bool,
        seen: Mutex<Vec<String>>,
        closed: Arc<AtomicUsize>,
    }

    struct FakeSession {
        unreachable: bool,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SqlBackend for FakeBackend {
        async fn connect(&self, dsn: &str) -> Result<Box<dyn SqlSession>, PgError> {
            if dsn.starts_with("bad") {
                return Err(PgError::ConnectionSetupFailed("invalid dsn".into()));
            }
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.seen.lock().unwrap().push(dsn.to_string());
            Ok(Box::new(FakeSession {
                unreachable: self.unreachable,
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    #[async_trait]
    impl SqlSession for FakeSession {
        async fn ping(&mut self) -> Result<(), String> {
            if self.unreachable {
                Err("connection refused".into())
            } else {
                Ok(())
            }
        }

        async fn query(&mut self, sql: &str) -> Result<Vec<SqlRow>, String> {
            if sql.starts_with("SELECT") {
                let mut row = SqlRow::new();
                row.insert("n".into(), json!(1));
                Ok(vec![row])
            } else {
                Err(format!("syntax error at or near \"{sql}\""))
            }
        }

        async fn close(self: Box<Self>) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn manager(backend: FakeBackend) -> ConnectionManager<FakeBackend> {
        ConnectionManager::with_backend(Arc::new(ConnectionStore::new()), backend)
    }

    fn query(dsn: &str, id: &str, sql: &str) -> QueryRequest {
        QueryRequest {
            connection_string: dsn.into(),
            connection_string_id: id.into(),
            query: sql.into(),
        }
    }

    #[tokio::test]
    async fn exactly_one_input_is_required() {
        let m = manager(FakeBackend::default());
        let both = ConnectRequest {
            connection_string: "postgres://a".into(),
            connection_string_id: "conn_x".into(),
        };
        assert_eq!(m.connect(&both).await, Err(PgError::BothInputsProvided));
        assert_eq!(
            m.connect(&ConnectRequest::default()).await,
            Err(PgError::NeitherInputProvided)
        );
    }

    #[tokio::test]
    async fn stored_ids_resolve_to_their_dsn() {
        let backend = FakeBackend::default();
        let m = manager(backend);
        let stored = m.store_connection_string("postgres://stored");
        assert!(stored.id.starts_with("conn_"));

        let result = m
            .execute_query(&query("", &stored.id, "SELECT 1"))
            .await
            .unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(m.backend.seen.lock().unwrap().as_slice(), ["postgres://stored"]);

        let missing = m.execute_query(&query("", "conn_missing", "SELECT 1")).await;
        assert_eq!(missing.unwrap_err(), PgError::ConnIdNotFound("conn_missing".into()));
    }

    #[tokio::test]
    async fn clearing_the_shared_store_forgets_ids() {
        let store = Arc::new(ConnectionStore::new());
        let m = ConnectionManager::with_backend(Arc::clone(&store), FakeBackend::default());
        let stored = m.store_connection_string("postgres://stored");
        assert_eq!(store.len(), 1);

        store.clear();

        let err = m
            .execute_query(&query("", &stored.id, "SELECT 1"))
            .await
            .unwrap_err();
        assert_eq!(err, PgError::ConnIdNotFound(stored.id));
    }

    #[tokio::test]
    async fn unreachable_database_is_reported_not_raised() {
        let m = manager(FakeBackend {
            unreachable: true,
            ..Default::default()
        });
        let req = ConnectRequest {
            connection_string: "postgres://down".into(),
            ..Default::default()
        };
        let result = m.connect(&req).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("connection refused"));

        let err = m
            .execute_query(&query("postgres://down", "", "SELECT 1"))
            .await
            .unwrap_err();
        assert!(matches!(err, PgError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn malformed_dsn_is_an_error() {
        let m = manager(FakeBackend::default());
        let req = ConnectRequest {
            connection_string: "bad dsn".into(),
            ..Default::default()
        };
        let err = m.connect(&req).await.unwrap_err();
        assert!(matches!(err, PgError::ConnectionSetupFailed(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn sql_errors_land_in_the_result() {
        let m = manager(FakeBackend::default());
        let result = m
            .execute_query(&query("postgres://up", "", "SELEC 1"))
            .await
            .unwrap();
        assert!(result.rows.is_empty());
        assert!(result.error.as_deref().unwrap().contains("syntax error"));
        assert_eq!(m.backend.closed.load(Ordering::SeqCst), 1);

        let body = serde_json::to_value(&result).unwrap();
        assert!(body["time"].as_str().unwrap().ends_with("ms"));
        assert_eq!(body["rows"], Value::Array(vec![]));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_connect_times_out() {
        let m = manager(FakeBackend {
            hang: true,
            ..Default::default()
        })
        .with_connect_timeout(Duration::from_secs(2));
        let req = ConnectRequest {
            connection_string: "postgres://slow".into(),
            ..Default::default()
        };
        let result = m.connect(&req).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("timed out after 2000ms"));
    }

    #[test]
    fn requests_use_camel_case() {
        let req: QueryRequest = serde_json::from_value(json!({
            "connectionStringId": "conn_1",
            "query": "SELECT 1"
        }))
        .unwrap();
        assert_eq!(req.connection_string_id, "conn_1");
        assert!(req.connection_string.is_empty());
    }
}
