use std::time::Duration;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Passive wait standing in for blocking I/O; races the sleep against `token`.
pub async fn wait(token: &CancellationToken, wait: Duration) -> WaitOutcome {
    tokio::select! {
        _ = tokio::time::sleep(wait) => WaitOutcome::Elapsed,
        _ = token.cancelled() => WaitOutcome::Cancelled,
    }
}
