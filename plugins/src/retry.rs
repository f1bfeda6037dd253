use std::time::Duration;

use jobsub_core::config::SubmitConfig;
use jobsub_core::submit::RetryStrategy;

/// Same pause before every retry, up to a fixed number of retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelayRetry {
    max_retries: u32,
    delay: Duration,
}

impl FixedDelayRetry {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(cfg: &SubmitConfig) -> Self {
        Self::new(cfg.max_retries, Duration::from_millis(cfg.retry_delay_ms))
    }
}

impl Default for FixedDelayRetry {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

impl RetryStrategy for FixedDelayRetry {
    fn name(&self) -> &str {
        "fixed-delay"
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn delay(&self, _retry: u32) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_five_one_second_retries() {
        let retry = FixedDelayRetry::default();
        assert_eq!(retry.max_attempts(), 6);
        for failures in 1..=5 {
            assert_eq!(retry.next_delay(failures), Some(Duration::from_secs(1)));
        }
        assert_eq!(retry.next_delay(6), None);
    }

    #[test]
    fn config_values_are_used() {
        let retry = FixedDelayRetry::from_config(&SubmitConfig {
            max_retries: 0,
            retry_delay_ms: 250,
        });
        assert_eq!(retry.next_delay(1), None);
        assert_eq!(retry.delay(1), Duration::from_millis(250));
    }
}
