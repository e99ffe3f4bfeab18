use std::{
    hint::black_box,
    time::{Duration, Instant},
};

use tokio_util::sync::CancellationToken;

/// Spins until `duration` has elapsed since the call or `token` fires.
///
/// The token is polled on every iteration, so cancellation latency is bounded by the cost of a
/// single iteration. Returns the number of completed iterations.
pub fn spin(token: &CancellationToken, duration: Duration) -> u64 {
    // Far-future durations overflow `Instant`; such a worker only stops on cancellation.
    let deadline = Instant::now().checked_add(duration);
    let mut acc: u64 = 0;
    let mut iterations: u64 = 0;

    while deadline.is_none_or(|d| Instant::now() < d) {
        if token.is_cancelled() {
            break;
        }
        acc = black_box(acc.wrapping_mul(31).wrapping_add(iterations ^ 0x9e37_79b9));
        iterations = iterations.wrapping_add(1);
    }

    black_box(acc);
    iterations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_after_duration() {
        let token = CancellationToken::new();
        let start = Instant::now();
        let iterations = spin(&token, Duration::from_millis(30));

        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(iterations > 0);
    }

    #[test]
    fn cancelled_token_stops_before_first_iteration() {
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(spin(&token, Duration::from_secs(60)), 0);
    }
}
