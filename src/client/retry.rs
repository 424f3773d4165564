use crate::{Error, Result};
use std::{future::Future, time::Duration};

/// How often and how patiently a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, bon::Builder)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    #[builder(default = 3)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_millis(1000))]
    pub base_delay: Duration,
    #[builder(default = 2.0)]
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> AttemptBackoff {
        AttemptBackoff::new(*self)
    }
}

/// Exponential delays capped by attempt count rather than elapsed time.
#[derive(Debug, Clone)]
pub struct AttemptBackoff {
    policy: RetryPolicy,
    current_delay: Duration,
    retries: u32,
}

impl AttemptBackoff {
    fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            current_delay: policy.base_delay,
            retries: 0,
        }
    }
}

impl backoff::backoff::Backoff for AttemptBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries + 1 >= self.policy.max_attempts {
            return None;
        }

        let delay = self.current_delay;
        self.retries += 1;
        self.current_delay = self.current_delay.mul_f64(self.policy.multiplier.max(1.0));

        Some(delay)
    }

    fn reset(&mut self) {
        self.current_delay = self.policy.base_delay;
        self.retries = 0;
    }
}

/// Runs `operation` until it succeeds, fails permanently or the policy is
/// exhausted. Only [`Error::is_transient`] failures are retried.
pub async fn retry_transient<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    backoff::future::retry_notify(
        policy.backoff(),
        || {
            let attempt = operation();
            async move {
                attempt.await.map_err(|e| {
                    if e.is_transient() {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        },
        |e: Error, delay: Duration| {
            tracing::warn!("transient failure ({}), retrying in {:?}", e, delay);
        },
    )
    .await
}
