//! Delay schedules for the retry executor
//!
//! A schedule maps a 0-based retry index to the delay slept before that retry.
//! Both shapes are non-decreasing and bounded by [`DelaySchedule::cap`].

use std::time::Duration;

use backoff::backoff::Backoff;

use crate::error::{Result, ServiceError};

/// Delays used by the provider-overload table, in seconds
const OVERLOAD_TABLE_SECS: [u64; 8] = [5, 10, 20, 30, 45, 60, 90, 120];

/// How long to wait before each retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelaySchedule {
    /// `min(initial * 2^attempt, cap)`
    Exponential { initial: Duration, cap: Duration },

    /// `delays[attempt]`, or `fallback` once the table runs out
    Table(DelayTable),
}

/// Validated delay table, only built through [`DelaySchedule::table`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayTable {
    delays: Vec<Duration>,
    fallback: Duration,
}

impl DelayTable {
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn fallback(&self) -> Duration {
        self.fallback
    }
}

impl Default for DelaySchedule {
    fn default() -> Self {
        Self::exponential(Duration::from_secs(2), Duration::from_secs(30))
    }
}

impl DelaySchedule {
    pub fn exponential(initial: Duration, cap: Duration) -> Self {
        DelaySchedule::Exponential { initial, cap }
    }

    /// Build a table schedule.
    ///
    /// The table must be non-decreasing and the fallback may not undercut its
    /// last entry, otherwise delays could shrink between retries.
    pub fn table(delays: Vec<Duration>, fallback: Duration) -> Result<Self> {
        if delays.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(ServiceError::configuration(
                "Delay table must be non-decreasing",
            ));
        }

        if let Some(last) = delays.last() {
            if fallback < *last {
                return Err(ServiceError::configuration(format!(
                    "Delay table fallback {:?} is below its last entry {:?}",
                    fallback, last
                )));
            }
        }

        Ok(DelaySchedule::Table(DelayTable { delays, fallback }))
    }

    /// Long table used when a provider is known to shed load for minutes
    pub fn overload_table() -> Self {
        let delays: Vec<Duration> = OVERLOAD_TABLE_SECS
            .iter()
            .map(|secs| Duration::from_secs(*secs))
            .collect();

        DelaySchedule::Table(DelayTable {
            delays,
            fallback: Duration::from_secs(120),
        })
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            DelaySchedule::Exponential { initial, cap } => 2u32
                .checked_pow(attempt)
                .and_then(|factor| initial.checked_mul(factor))
                .map_or(*cap, |delay| delay.min(*cap)),
            DelaySchedule::Table(table) => table
                .delays
                .get(attempt as usize)
                .copied()
                .unwrap_or(table.fallback),
        }
    }

    /// Upper bound of every delay this schedule produces
    pub fn cap(&self) -> Duration {
        match self {
            DelaySchedule::Exponential { cap, .. } => *cap,
            DelaySchedule::Table(table) => table.fallback,
        }
    }
}

/// [`Backoff`] adapter that walks a [`DelaySchedule`] and stops after
/// `max_retries` delays.
#[derive(Debug, Clone)]
pub struct ScheduledBackoff {
    schedule: DelaySchedule,
    max_retries: u32,
    attempt: u32,
}

impl ScheduledBackoff {
    pub fn new(schedule: DelaySchedule, max_retries: u32) -> Self {
        Self {
            schedule,
            max_retries,
            attempt: 0,
        }
    }
}

impl Backoff for ScheduledBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }

        let delay = self.schedule.delay_for(self.attempt);
        self.attempt += 1;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_monotone_and_capped(schedule: &DelaySchedule) {
        let mut previous = Duration::ZERO;
        for attempt in 0..64 {
            let delay = schedule.delay_for(attempt);
            assert!(delay >= previous, "delay shrank at attempt {}", attempt);
            assert!(delay <= schedule.cap(), "delay above cap at attempt {}", attempt);
            previous = delay;
        }
    }

    #[test]
    fn test_exponential_doubles_until_cap() {
        let schedule = DelaySchedule::exponential(Duration::from_secs(1), Duration::from_secs(8));

        assert_eq!(schedule.delay_for(0), Duration::from_secs(1));
        assert_eq!(schedule.delay_for(1), Duration::from_secs(2));
        assert_eq!(schedule.delay_for(2), Duration::from_secs(4));
        assert_eq!(schedule.delay_for(3), Duration::from_secs(8));
        assert_eq!(schedule.delay_for(4), Duration::from_secs(8));
        assert_eq!(schedule.delay_for(u32::MAX), Duration::from_secs(8));
    }

    #[test]
    fn test_schedules_are_monotone_and_capped() {
        assert_monotone_and_capped(&DelaySchedule::default());
        assert_monotone_and_capped(&DelaySchedule::exponential(
            Duration::from_millis(3),
            Duration::from_millis(1),
        ));
        assert_monotone_and_capped(&DelaySchedule::overload_table());
    }

    #[test]
    fn test_table_falls_back_past_the_end() {
        let schedule = DelaySchedule::overload_table();

        assert_eq!(schedule.delay_for(0), Duration::from_secs(5));
        assert_eq!(schedule.delay_for(7), Duration::from_secs(120));
        assert_eq!(schedule.delay_for(8), Duration::from_secs(120));
        assert_eq!(schedule.delay_for(100), Duration::from_secs(120));
    }

    #[test]
    fn test_table_rejects_shrinking_delays() {
        let shrinking = DelaySchedule::table(
            vec![Duration::from_secs(2), Duration::from_secs(1)],
            Duration::from_secs(5),
        );
        assert!(shrinking.is_err());

        let low_fallback = DelaySchedule::table(
            vec![Duration::from_secs(1), Duration::from_secs(4)],
            Duration::from_secs(2),
        );
        assert!(low_fallback.is_err());

        let empty = DelaySchedule::table(Vec::new(), Duration::from_secs(1));
        assert!(empty.is_ok());
    }

    #[test]
    fn test_overload_table_passes_table_validation() {
        let DelaySchedule::Table(table) = DelaySchedule::overload_table() else {
            panic!("overload preset should be a table");
        };

        let rebuilt = DelaySchedule::table(table.delays().to_vec(), table.fallback()).unwrap();
        assert_eq!(rebuilt, DelaySchedule::Table(table.clone()));
        assert_eq!(table.delays().len(), 8);
        assert_eq!(table.fallback(), Duration::from_secs(120));
    }

    #[test]
    fn test_scheduled_backoff_stops_after_budget() {
        let mut backoff = ScheduledBackoff::new(
            DelaySchedule::exponential(Duration::from_millis(10), Duration::from_millis(25)),
            3,
        );

        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(10)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(20)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(25)));
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(10)));
    }
}
