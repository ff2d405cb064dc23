use governor::clock::{Clock, DefaultClock, Reference};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::middleware::NoOpMiddleware;
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Seconds until the identifier may try again. Zero when allowed.
    pub retry_after_secs: u64,
}

pub trait RateLimiter: Send + Sync {
    /// Records a request for `identifier` and reports whether it fits in the window.
    fn check(&self, identifier: &str) -> RateLimitDecision;
}

type KeyedGovernor<C> =
    Governor<String, DefaultKeyedStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// In-process GCRA limiter keyed by identifier: a burst of `max_requests`,
/// refilled evenly over `window`. Keys that have fully refilled are dropped
/// at most once per window.
pub struct KeyedRateLimiter<C: Clock = DefaultClock> {
    /// `None` when `max_requests` is zero.
    limiter: Option<KeyedGovernor<C>>,
    clock: C,
    window: Duration,
    last_sweep: Mutex<Option<C::Instant>>,
}

impl KeyedRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self::with_clock(window, max_requests, DefaultClock::default())
    }
}

impl<C> KeyedRateLimiter<C>
where
    C: Clock + Clone,
{
    pub fn with_clock(window: Duration, max_requests: u32, clock: C) -> Self {
        let limiter = NonZeroU32::new(max_requests).map(|max| {
            let period = (window / max.get()).max(Duration::from_millis(1));
            let quota = Quota::with_period(period)
                .unwrap_or_else(|| Quota::per_second(max))
                .allow_burst(max);
            Governor::new(quota, DefaultKeyedStateStore::default(), clock.clone())
        });
        Self {
            limiter,
            clock,
            window,
            last_sweep: Mutex::new(None),
        }
    }

    fn sweep(&self, limiter: &KeyedGovernor<C>, now: C::Instant) {
        let mut last = self
            .last_sweep
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match *last {
            Some(previous) if Duration::from(now.duration_since(previous)) < self.window => {}
            Some(_) => {
                limiter.retain_recent();
                limiter.shrink_to_fit();
                debug!("Rate limiter holds {} identifiers after sweep", limiter.len());
                *last = Some(now);
            }
            None => *last = Some(now),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.limiter.as_ref().map_or(0, |l| l.len())
    }
}

impl<C> RateLimiter for KeyedRateLimiter<C>
where
    C: Clock + Clone + Send + Sync,
    C::Instant: Send,
{
    fn check(&self, identifier: &str) -> RateLimitDecision {
        let Some(limiter) = &self.limiter else {
            return RateLimitDecision {
                allowed: false,
                retry_after_secs: self.window.as_secs(),
            };
        };

        let now = self.clock.now();
        self.sweep(limiter, now);

        match limiter.check_key(&identifier.to_string()) {
            Ok(()) => RateLimitDecision {
                allowed: true,
                retry_after_secs: 0,
            },
            Err(not_until) => {
                let wait = not_until.wait_time_from(now);
                RateLimitDecision {
                    allowed: false,
                    retry_after_secs: (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1),
                }
            }
        }
    }
}
