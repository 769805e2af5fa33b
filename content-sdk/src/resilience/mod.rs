//! Resilience patterns for upstream calls
//!
//! Retry execution with capped, non-decreasing delay schedules.

pub mod retry;
pub mod schedule;

pub use retry::{AttemptOutcome, RetryAttempt, RetryConfig, RetryExecutor};
pub use schedule::{DelaySchedule, DelayTable, ScheduledBackoff};
