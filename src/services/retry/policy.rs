use std::time::Duration;

use crate::models::{ConfirmationConfig, RetryPolicyConfig};

/// Exponential backoff bounds for transaction lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, the first one included
	pub max_attempts: u32,
	/// Sleep after the first miss; doubled after every further miss
	pub base_delay: Duration,
	pub max_delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::from(&RetryPolicyConfig::default())
	}
}

impl From<&RetryPolicyConfig> for RetryPolicy {
	fn from(config: &RetryPolicyConfig) -> Self {
		Self {
			max_attempts: config.max_attempts.max(1),
			base_delay: Duration::from_millis(config.base_delay_ms),
			max_delay: Duration::from_millis(config.max_delay_ms),
		}
	}
}

impl RetryPolicy {
	/// Sleep before attempt `attempt + 1`, i.e. `base_delay * 2^attempt` capped at `max_delay`
	pub fn delay_after(&self, attempt: u32) -> Duration {
		let factor = 2u32.saturating_pow(attempt);
		self.base_delay.saturating_mul(factor).min(self.max_delay)
	}

	/// Sum of every sleep taken when all attempts miss
	pub fn total_backoff(&self) -> Duration {
		(0..self.max_attempts.saturating_sub(1))
			.map(|attempt| self.delay_after(attempt))
			.sum()
	}
}

/// Fixed-interval polling bounds for confirmation waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
	pub poll_interval: Duration,
	pub max_wait: Duration,
}

impl Default for ConfirmationPolicy {
	fn default() -> Self {
		Self::from(&ConfirmationConfig::default())
	}
}

impl From<&ConfirmationConfig> for ConfirmationPolicy {
	fn from(config: &ConfirmationConfig) -> Self {
		Self {
			poll_interval: Duration::from_millis(config.poll_interval_ms),
			max_wait: Duration::from_millis(config.max_wait_ms),
		}
	}
}

impl ConfirmationPolicy {
	/// Polls after the first one that fit inside `max_wait`
	pub fn max_retries(&self) -> usize {
		if self.poll_interval.is_zero() {
			return 0;
		}
		(self.max_wait.as_millis() / self.poll_interval.as_millis()) as usize
	}
}
