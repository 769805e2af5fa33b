//! Retry with capped backoff for transient upstream failures
//!
//! The executor runs an operation, classifies failures with
//! [`ServiceError::is_retryable`], sleeps according to a [`DelaySchedule`] and
//! gives up once the retry budget is spent.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use tracing::{debug, warn};

use super::schedule::{DelaySchedule, ScheduledBackoff};
use crate::error::{Result, ServiceError};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means a single attempt)
    pub max_retries: u32,

    /// Delays between attempts
    pub schedule: DelaySchedule,

    /// Time limit for each individual attempt
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            schedule: DelaySchedule::default(),
            attempt_timeout: None,
        }
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryConfig {{ max_retries: {}, schedule: {:?}, attempt_timeout: {:?} }}",
            self.max_retries, self.schedule, self.attempt_timeout
        )
    }
}

/// How a single attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RetryableFailure,
    FatalFailure,
}

/// Record of one attempt, handed to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 0-based attempt index
    pub index: u32,

    /// Total time slept before this attempt started
    pub elapsed_delay: Duration,

    pub outcome: AttemptOutcome,
}

/// Executor for retry operations
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    /// Retry configuration
    config: RetryConfig,

    /// Name used in log events
    operation: String,
}

impl RetryExecutor {
    /// Create a new retry executor with the specified configuration
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            operation: "operation".to_string(),
        }
    }

    /// Name the operation in log events
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Execute a fallible operation with retries according to the configuration
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_observed(operation, |_| {}).await
    }

    /// Like [`execute`](Self::execute), reporting every attempt to `observer`
    pub async fn execute_observed<F, Fut, T, O>(&self, operation: F, mut observer: O) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
        O: FnMut(&RetryAttempt),
    {
        let mut backoff = ScheduledBackoff::new(self.config.schedule.clone(), self.config.max_retries);
        let mut index = 0u32;
        let mut elapsed_delay = Duration::ZERO;

        loop {
            let result = self.run_attempt(&operation).await;

            let outcome = match result {
                Ok(_) => AttemptOutcome::Success,
                Err(ref err) if err.is_retryable() => AttemptOutcome::RetryableFailure,
                Err(_) => AttemptOutcome::FatalFailure,
            };
            observer(&RetryAttempt {
                index,
                elapsed_delay,
                outcome,
            });

            let err = match result {
                Ok(value) => {
                    if index > 0 {
                        debug!(
                            operation = %self.operation,
                            attempts = index + 1,
                            "Operation succeeded after retrying"
                        );
                    }
                    return Ok(value);
                }
                Err(err) if outcome == AttemptOutcome::FatalFailure => return Err(err),
                Err(err) => err,
            };

            match backoff.next_backoff() {
                Some(delay) => {
                    warn!(
                        operation = %self.operation,
                        attempt = index + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retryable failure, backing off"
                    );

                    tokio::time::sleep(delay).await;
                    elapsed_delay += delay;
                    index += 1;
                }
                None => {
                    warn!(
                        operation = %self.operation,
                        attempts = index + 1,
                        error = %err,
                        "Retry budget exhausted"
                    );
                    return Err(ServiceError::retries_exhausted(index + 1, err));
                }
            }
        }
    }

    async fn run_attempt<F, Fut, T>(&self, operation: &F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.config.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, operation()).await {
                Ok(result) => result,
                Err(_) => Err(ServiceError::timeout(format!(
                    "{} attempt exceeded {}ms",
                    self.operation,
                    limit.as_millis()
                ))),
            },
            None => operation().await,
        }
    }

    /// Get the current retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            schedule: DelaySchedule::exponential(Duration::from_millis(10), Duration::from_millis(40)),
            attempt_timeout: None,
        }
    }

    #[tokio::test]
    async fn test_successful_operation() {
        let retry = RetryExecutor::new(RetryConfig::default());
        let result = retry.execute(|| async { Ok::<_, ServiceError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_rate_limit() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let retry = RetryExecutor::new(fast_config(2));
        let attempt_count_clone = Arc::clone(&attempt_count);

        let result = retry
            .execute(move || {
                let attempt_count_clone = Arc::clone(&attempt_count_clone);
                async move {
                    let current_attempt = attempt_count_clone.fetch_add(1, Ordering::SeqCst);

                    if current_attempt < 2 {
                        Err(ServiceError::upstream(UpstreamErrorKind::RateLimited, 429, None))
                    } else {
                        Ok::<_, ServiceError>(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_fatal_error() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let retry = RetryExecutor::new(RetryConfig::default());
        let attempt_count_clone = Arc::clone(&attempt_count);

        let result: Result<()> = retry
            .execute(move || {
                let attempt_count_clone = Arc::clone(&attempt_count_clone);
                async move {
                    attempt_count_clone.fetch_add(1, Ordering::SeqCst);
                    Err(ServiceError::upstream(
                        UpstreamErrorKind::Fatal,
                        400,
                        Some("API key not valid".to_string()),
                    ))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.upstream_kind(), Some(UpstreamErrorKind::Fatal));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_retries_exceeded() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let retry = RetryExecutor::new(fast_config(2));
        let attempt_count_clone = Arc::clone(&attempt_count);

        let result: Result<()> = retry
            .execute(move || {
                let attempt_count_clone = Arc::clone(&attempt_count_clone);
                async move {
                    attempt_count_clone.fetch_add(1, Ordering::SeqCst);
                    Err(ServiceError::network("Persistent failure"))
                }
            })
            .await;

        match result {
            Err(ServiceError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, ServiceError::Network(_)));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3); // Initial + 2 retries
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_schedule() {
        let retry = RetryExecutor::new(fast_config(3));
        let attempt_count = AtomicUsize::new(0);
        let mut seen = Vec::new();

        let result = retry
            .execute_observed(
                || {
                    let current = attempt_count.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if current < 3 {
                            Err(ServiceError::upstream(UpstreamErrorKind::Unavailable, 503, None))
                        } else {
                            Ok("done")
                        }
                    }
                },
                |attempt| seen.push(attempt.clone()),
            )
            .await;

        assert_eq!(result.unwrap(), "done");
        let delays: Vec<u64> = seen.iter().map(|a| a.elapsed_delay.as_millis() as u64).collect();
        assert_eq!(delays, vec![0, 10, 30, 70]);
        assert_eq!(seen[3].outcome, AttemptOutcome::Success);
        assert!(seen[..3]
            .iter()
            .all(|a| a.outcome == AttemptOutcome::RetryableFailure));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_counts_as_retryable_timeout() {
        let config = RetryConfig {
            attempt_timeout: Some(Duration::from_millis(50)),
            ..fast_config(1)
        };
        let retry = RetryExecutor::new(config);
        let attempt_count = AtomicUsize::new(0);

        let result = retry
            .execute(|| {
                let current = attempt_count.fetch_add(1, Ordering::SeqCst);
                async move {
                    if current == 0 {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    Ok::<_, ServiceError>(current)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    }
}
