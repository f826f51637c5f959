//! Stale Counter Sweeper
//!
//! Counter entries are reset lazily on their next request, so an idle
//! client's entry otherwise stays in memory forever. The sweeper removes
//! entries whose window has ended. Removal is indistinguishable from the
//! lazy reset, so it never changes an admission decision.

use platform::clock::Clock;
use platform::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn a task purging stale entries every `every`
pub fn spawn_stale_sweeper(
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = limiter.purge_stale(clock.now_ms());
            if removed > 0 {
                tracing::debug!(
                    removed,
                    tracked = limiter.len(),
                    "Purged stale rate limit entries"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::clock::ManualClock;
    use platform::rate_limit::{AdmissionPolicy, PolicyTable};

    #[tokio::test]
    async fn test_sweeper_purges_expired_windows() {
        let clock = ManualClock::new(1_700_000_000_000);
        let limiter = Arc::new(RateLimiter::new(PolicyTable::new(AdmissionPolicy::new(5, 60))));
        limiter.admit("10.0.0.1", "/posts/", clock.now_ms()).unwrap();
        limiter.admit("10.0.0.2", "/posts/", clock.now_ms()).unwrap();

        clock.advance(Duration::from_secs(61));
        let handle = spawn_stale_sweeper(
            limiter.clone(),
            Arc::new(clock.clone()),
            Duration::from_millis(10),
        );

        for _ in 0..100 {
            if limiter.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(limiter.is_empty());
    }
}
