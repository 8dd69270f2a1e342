//! Bounded polling shared by every wait in the crate.
//!
//! A probe is called immediately, then once per `interval` until it succeeds
//! or `budget` has elapsed since the first call. Cancellation is only checked
//! between attempts; an attempt in flight always completes.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub budget: Duration,
}

impl PollPolicy {
    pub const fn new(interval: Duration, budget: Duration) -> Self {
        Self { interval, budget }
    }

    /// Create: 10s interval, 1 minute budget.
    pub const fn create() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(60))
    }

    /// Delete: 1 minute interval, 30 minute budget.
    pub const fn delete() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(30 * 60))
    }
}

#[derive(Debug)]
pub enum PollOutcome<T, E> {
    Converged(T),
    TimedOut { attempts: u32, last: Option<E> },
    Cancelled { attempts: u32, last: Option<E> },
}

impl<T, E> PollOutcome<T, E> {
    pub fn is_converged(&self) -> bool {
        matches!(self, PollOutcome::Converged(_))
    }
}

pub async fn poll_until<T, E, F, Fut>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut probe: F,
) -> PollOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let deadline = Instant::now() + policy.budget;
    let mut attempts = 0u32;
    let mut last = None;
    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled { attempts, last };
        }
        attempts += 1;
        match probe().await {
            Ok(v) => return PollOutcome::Converged(v),
            Err(e) => last = Some(e),
        }
        let now = Instant::now();
        if now >= deadline {
            return PollOutcome::TimedOut { attempts, last };
        }
        let wait = policy.interval.min(deadline - now);
        trace!(attempts, ?wait, "poll: not converged, waiting");
        sleep(wait).await;
    }
}
