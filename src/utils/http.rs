//! HTTP client construction with transient-error retries.
//!
//! The JSON-RPC transport sends every request through a `reqwest-middleware` client
//! that retries transient failures (timeouts, 5xx, connection resets) before the
//! endpoint manager ever sees them.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
	policies::ExponentialBackoff, Jitter, RetryTransientMiddleware, RetryableStrategy,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_max_retries() -> u32 {
	3
}

fn default_base_for_backoff() -> u32 {
	2
}

fn default_initial_backoff() -> Duration {
	Duration::from_millis(250)
}

fn default_max_backoff() -> Duration {
	Duration::from_secs(10)
}

/// Jitter applied to the transport backoff
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
	None,
	#[default]
	Full,
}

/// Transport-level retry settings for RPC requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RetryConfig {
	/// Retries after the first request
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	/// Exponent base between retries
	#[serde(default = "default_base_for_backoff")]
	pub base_for_backoff: u32,
	#[serde(default = "default_initial_backoff")]
	pub initial_backoff: Duration,
	#[serde(default = "default_max_backoff")]
	pub max_backoff: Duration,
	#[serde(default)]
	pub jitter: JitterSetting,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_retries: default_max_retries(),
			base_for_backoff: default_base_for_backoff(),
			initial_backoff: default_initial_backoff(),
			max_backoff: default_max_backoff(),
			jitter: JitterSetting::default(),
		}
	}
}

/// Wraps `base_client` with retry middleware built from `config`.
///
/// # Arguments
/// * `config` - Retry bounds and jitter
/// * `base_client` - Preconfigured reqwest client (timeouts, pooling)
/// * `custom_strategy` - Optional classification of retryable responses
///
/// # Returns
/// * `ClientWithMiddleware` - Client applying the policy to every request
pub fn create_retryable_http_client<S>(
	config: &RetryConfig,
	base_client: reqwest::Client,
	custom_strategy: Option<S>,
) -> ClientWithMiddleware
where
	S: RetryableStrategy + Send + Sync + 'static,
{
	let jitter = match config.jitter {
		JitterSetting::None => Jitter::None,
		JitterSetting::Full => Jitter::Full,
	};

	let retry_policy = ExponentialBackoff::builder()
		.jitter(jitter)
		.base(config.base_for_backoff)
		.retry_bounds(config.initial_backoff, config.max_backoff)
		.build_with_max_retries(config.max_retries);

	let builder = ClientBuilder::new(base_client);
	match custom_strategy {
		Some(strategy) => builder.with(RetryTransientMiddleware::new_with_policy_and_strategy(
			retry_policy,
			strategy,
		)),
		None => builder.with(RetryTransientMiddleware::new_with_policy(retry_policy)),
	}
	.build()
}
