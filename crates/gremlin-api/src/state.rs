use std::sync::Arc;

use gremlin_load::{CancellationToken, LoadCoordinator};
use gremlin_pg::{ConnectionManager, PgBackend, SqlBackend};
use gremlin_send::HttpSender;
use tokio_util::sync::DropGuard;

/// Everything the handlers share for the lifetime of the server.
pub struct ApiState<B = PgBackend> {
    pub coordinator: LoadCoordinator,
    pub postgres: Arc<ConnectionManager<B>>,
    pub sender: HttpSender,
    /// Parent of every per-request token; cancelled on server shutdown.
    pub shutdown: CancellationToken,
}

impl<B: SqlBackend> ApiState<B> {
    pub fn new(
        coordinator: LoadCoordinator,
        postgres: Arc<ConnectionManager<B>>,
        sender: HttpSender,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            coordinator,
            postgres,
            sender,
            shutdown,
        }
    }

    /// Token scoped to one request.
    ///
    /// The guard cancels it when dropped, which happens when the handler future is dropped
    /// after the client disconnects.
    pub(crate) fn request_token(&self) -> (CancellationToken, DropGuard) {
        let token = self.shutdown.child_token();
        let guard = token.clone().drop_guard();
        (token, guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gremlin_pg::ConnectionStore;

    fn state() -> ApiState {
        ApiState::new(
            LoadCoordinator::new(),
            Arc::new(ConnectionManager::new(Arc::new(ConnectionStore::new()))),
            HttpSender::new(),
            CancellationToken::new(),
        )
    }

    #[test]
    fn dropping_the_guard_cancels_only_the_request() {
        let state = state();
        let (token, guard) = state.request_token();
        assert!(!token.is_cancelled());
        drop(guard);
        assert!(token.is_cancelled());
        assert!(!state.shutdown.is_cancelled());
    }

    #[test]
    fn shutdown_reaches_request_tokens() {
        let state = state();
        let (token, _guard) = state.request_token();
        state.shutdown.cancel();
        assert!(token.is_cancelled());
    }
}
