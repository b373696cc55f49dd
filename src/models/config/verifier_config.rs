//! Verifier configuration loading and validation.
//!
//! The configuration is a single JSON file. Connection details that differ between
//! deployments can be overridden from the environment (or a `.env` file):
//! `POLLS_RPC_URL`, `POLLS_CONTRACT_ADDRESS` and `POLLS_STORAGE_PATH`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};
use tokio_cron_scheduler::Job;
use url::Url;

use crate::{
	models::{config::error::ConfigError, ConfigLoader, Network, RpcUrl},
	utils::is_valid_address,
};

/// Location used when no `--config` path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/verifier.json";

fn default_max_attempts() -> u32 {
	5
}

fn default_base_delay_ms() -> u64 {
	1_000
}

fn default_max_delay_ms() -> u64 {
	30_000
}

fn default_poll_interval_ms() -> u64 {
	250
}

fn default_max_wait_ms() -> u64 {
	300_000
}

fn default_pending_horizon_secs() -> u64 {
	3_600
}

fn default_batch_size() -> usize {
	20
}

fn default_storage_path() -> PathBuf {
	PathBuf::from("data/transactions")
}

/// Backoff applied while waiting for a transaction to become visible
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RetryPolicyConfig {
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	/// Delay before the second attempt; doubles after each attempt
	#[serde(default = "default_base_delay_ms")]
	pub base_delay_ms: u64,
	#[serde(default = "default_max_delay_ms")]
	pub max_delay_ms: u64,
}

impl Default for RetryPolicyConfig {
	fn default() -> Self {
		Self {
			max_attempts: default_max_attempts(),
			base_delay_ms: default_base_delay_ms(),
			max_delay_ms: default_max_delay_ms(),
		}
	}
}

/// Fixed-interval polling used by confirmation waits
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfirmationConfig {
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	#[serde(default = "default_max_wait_ms")]
	pub max_wait_ms: u64,
}

impl Default for ConfirmationConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: default_poll_interval_ms(),
			max_wait_ms: default_max_wait_ms(),
		}
	}
}

/// Settings for the pending-record sweep
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReconciliationConfig {
	/// Pending records older than this are left alone
	#[serde(default = "default_pending_horizon_secs")]
	pub pending_horizon_secs: u64,
	/// Maximum records checked per sweep
	#[serde(default = "default_batch_size")]
	pub batch_size: usize,
	/// Cron expression (with seconds) used by `sweep --schedule` when none is given
	#[serde(default)]
	pub sweep_schedule: Option<String>,
}

impl Default for ReconciliationConfig {
	fn default() -> Self {
		Self {
			pending_horizon_secs: default_pending_horizon_secs(),
			batch_size: default_batch_size(),
			sweep_schedule: None,
		}
	}
}

/// Top-level verifier configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
	pub network: Network,

	/// Deployed polls contract; when unset, receipts and logs are not address-checked
	#[serde(default)]
	pub contract_address: Option<String>,

	#[serde(default)]
	pub retry: RetryPolicyConfig,

	#[serde(default)]
	pub confirmation: ConfirmationConfig,

	#[serde(default)]
	pub reconciliation: ReconciliationConfig,

	/// Directory holding one JSON file per vote transaction record
	#[serde(default = "default_storage_path")]
	pub storage_path: PathBuf,

	/// Upper bound for a whole verification, retries included
	#[serde(default)]
	pub verification_timeout_ms: Option<u64>,
}

impl VerifierConfig {
	/// Applies `POLLS_*` overrides read through `lookup`.
	///
	/// # Arguments
	/// * `lookup` - Variable reader, usually `std::env::var(..).ok()`
	pub fn apply_env_overrides<F>(&mut self, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(url) = lookup("POLLS_RPC_URL").filter(|u| !u.trim().is_empty()) {
			self.network.rpc_urls = vec![RpcUrl {
				type_: "rpc".to_string(),
				url: url.trim().to_string(),
				weight: 100,
			}];
		}

		if let Some(address) = lookup("POLLS_CONTRACT_ADDRESS").filter(|a| !a.trim().is_empty()) {
			self.contract_address = Some(address.trim().to_string());
		}

		if let Some(path) = lookup("POLLS_STORAGE_PATH").filter(|p| !p.trim().is_empty()) {
			self.storage_path = PathBuf::from(path.trim());
		}
	}

	/// Loads the file, applies environment overrides, then validates.
	pub async fn load(path: &Path) -> Result<Self, ConfigError> {
		dotenvy::dotenv().ok();
		let mut config = Self::read_file(path).await?;
		config.apply_env_overrides(|key| std::env::var(key).ok());
		config.validate()?;
		config.validate_protocol();
		Ok(config)
	}

	async fn read_file(path: &Path) -> Result<Self, ConfigError> {
		let path_metadata = || {
			Some(HashMap::from([(
				"path".to_string(),
				path.display().to_string(),
			)]))
		};

		if !Self::is_json_file(path) {
			return Err(ConfigError::file_error(
				"configuration file must have a .json extension",
				None,
				path_metadata(),
			));
		}

		let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::file_error(
				format!("failed to read verifier config: {}", e),
				Some(Box::new(e)),
				path_metadata(),
			)
		})?;

		serde_json::from_str(&raw).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse verifier config: {}", e),
				Some(Box::new(e)),
				path_metadata(),
			)
		})
	}

	fn active_rpc_urls(&self) -> impl Iterator<Item = &RpcUrl> {
		self.network
			.rpc_urls
			.iter()
			.filter(|rpc_url| rpc_url.type_ == "rpc" && rpc_url.weight > 0)
	}
}

#[async_trait]
impl ConfigLoader for VerifierConfig {
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let config = Self::read_file(path).await?;
		config.validate()?;
		config.validate_protocol();
		Ok(config)
	}

	/// Ensures that:
	/// - the network has a slug and at least one enabled RPC endpoint
	/// - every RPC URL is an http(s) URL with a weight of at most 100
	/// - the contract address, when set, is 40 hex characters
	/// - retry, confirmation and sweep bounds are non-zero
	/// - the sweep schedule, when set, is a valid cron expression
	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.slug.is_empty()
			|| !self
				.network
				.slug
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
		{
			return Err(ConfigError::validation_error(
				"Network slug must contain only lowercase letters, numbers, and underscores",
				None,
				None,
			));
		}

		if self.active_rpc_urls().next().is_none() {
			return Err(ConfigError::validation_error(
				"At least one RPC URL of type 'rpc' with a non-zero weight is required",
				None,
				None,
			));
		}

		for rpc_url in &self.network.rpc_urls {
			let parsed = Url::parse(&rpc_url.url).map_err(|e| {
				ConfigError::validation_error(
					format!("Invalid RPC URL: {}", e),
					Some(Box::new(e)),
					Some(HashMap::from([("url".to_string(), rpc_url.url.clone())])),
				)
			})?;
			if !matches!(parsed.scheme(), "http" | "https") {
				return Err(ConfigError::validation_error(
					"All RPC URLs must start with http:// or https://",
					None,
					Some(HashMap::from([("url".to_string(), rpc_url.url.clone())])),
				));
			}
			if rpc_url.weight > 100 {
				return Err(ConfigError::validation_error(
					"All RPC URL weights must be between 0 and 100",
					None,
					None,
				));
			}
		}

		if let Some(address) = &self.contract_address {
			if !is_valid_address(address) {
				return Err(ConfigError::validation_error(
					"contract_address must be 0x followed by 40 hex characters",
					None,
					Some(HashMap::from([("value".to_string(), address.clone())])),
				));
			}
		}

		if self.retry.max_attempts == 0 {
			return Err(ConfigError::validation_error(
				"retry.max_attempts must be at least 1",
				None,
				None,
			));
		}

		if self.retry.base_delay_ms == 0 || self.retry.max_delay_ms < self.retry.base_delay_ms {
			return Err(ConfigError::validation_error(
				"retry.base_delay_ms must be positive and not exceed retry.max_delay_ms",
				None,
				None,
			));
		}

		if self.confirmation.poll_interval_ms == 0
			|| self.confirmation.max_wait_ms < self.confirmation.poll_interval_ms
		{
			return Err(ConfigError::validation_error(
				"confirmation.poll_interval_ms must be positive and not exceed confirmation.max_wait_ms",
				None,
				None,
			));
		}

		if self.reconciliation.batch_size == 0 || self.reconciliation.pending_horizon_secs == 0 {
			return Err(ConfigError::validation_error(
				"reconciliation.batch_size and reconciliation.pending_horizon_secs must be positive",
				None,
				None,
			));
		}

		if let Some(schedule) = &self.reconciliation.sweep_schedule {
			Job::new(schedule.as_str(), |_, _| {}).map_err(|e| {
				ConfigError::validation_error(
					format!("Invalid sweep schedule: {}", e),
					None,
					Some(HashMap::from([("schedule".to_string(), schedule.clone())])),
				)
			})?;
		}

		if self.verification_timeout_ms == Some(0) {
			return Err(ConfigError::validation_error(
				"verification_timeout_ms must be positive when set",
				None,
				None,
			));
		}

		Ok(())
	}

	fn validate_protocol(&self) {
		for rpc_url in &self.network.rpc_urls {
			if rpc_url.url.starts_with("http://") {
				tracing::warn!(
					"RPC URL for network {} uses an insecure protocol: {}",
					self.network.slug,
					rpc_url.url
				);
			}
		}
	}
}
