//! The readiness gate: bounded polling until a backend accepts queries.
//!
//! Retry policy lives here and only here. Query execution is single-shot;
//! the gate is the one place the harness sleeps and tries again.

use std::future::Future;
use std::time::Duration;

use crate::error::Error;

/// Default number of poll attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 24;

/// Default interval between poll attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What a readiness probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The backend accepts queries.
    Ready,
    /// Not ready yet; carries a human-readable status for diagnostics.
    NotReady(String),
}

/// Polls a readiness predicate at a fixed interval up to a bounded number
/// of attempts. Exhaustion is a fatal error naming the last observed
/// status, never a silent continuation.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    max_attempts: u32,
    interval: Duration,
}

impl ReadinessGate {
    /// Create a gate with the default attempt budget and interval.
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the maximum number of attempts (at least one).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the interval between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll `probe` until it reports ready or the attempt budget is
    /// exhausted. Returns the number of attempts used.
    pub async fn wait_until_ready<P, Fut>(&self, mut probe: P) -> Result<u32, Error>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = ProbeStatus>,
    {
        let mut last = String::from("no status observed");

        for attempt in 1..=self.max_attempts {
            match probe().await {
                ProbeStatus::Ready => {
                    tracing::info!(attempt, "backend is ready");
                    return Ok(attempt);
                }
                ProbeStatus::NotReady(status) => {
                    tracing::debug!(attempt, status = %status, "backend not ready");
                    last = status;
                }
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(Error::Readiness {
            attempts: self.max_attempts,
            last,
        })
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_gate(attempts: u32) -> ReadinessGate {
        ReadinessGate::new()
            .with_max_attempts(attempts)
            .with_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_ready_on_later_attempt() {
        let mut polls = 0;
        let gate = fast_gate(10);
        let attempts = gate
            .wait_until_ready(|| {
                polls += 1;
                let status = if polls >= 3 {
                    ProbeStatus::Ready
                } else {
                    ProbeStatus::NotReady(format!("{} nodes alive", polls - 1))
                };
                async move { status }
            })
            .await
            .unwrap();
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_exhaustion_names_last_status() {
        let gate = fast_gate(4);
        let err = gate
            .wait_until_ready(|| async { ProbeStatus::NotReady("0 of 3 nodes alive".to_string()) })
            .await
            .unwrap_err();

        match err {
            Error::Readiness { attempts, last } => {
                assert_eq!(attempts, 4);
                assert_eq!(last, "0 of 3 nodes alive");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_immediate_ready_uses_one_attempt() {
        let gate = fast_gate(1);
        let attempts = gate
            .wait_until_ready(|| async { ProbeStatus::Ready })
            .await
            .unwrap();
        assert_eq!(attempts, 1);
    }
}
