//! Test helper utilities for verifier configuration
//!
//! - `VerifierConfigBuilder`: Builder for creating valid test `VerifierConfig` instances

use std::path::PathBuf;

use crate::{
	models::{
		ConfirmationConfig, Network, ReconciliationConfig, RetryPolicyConfig, RpcUrl,
		VerifierConfig,
	},
	utils::tests::builders::network::NetworkBuilder,
};

pub const TEST_CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Builds a `VerifierConfig` that passes validation unless told otherwise
pub struct VerifierConfigBuilder {
	network: Network,
	contract_address: Option<String>,
	retry: RetryPolicyConfig,
	confirmation: ConfirmationConfig,
	reconciliation: ReconciliationConfig,
	storage_path: PathBuf,
	verification_timeout_ms: Option<u64>,
}

impl Default for VerifierConfigBuilder {
	fn default() -> Self {
		Self {
			network: NetworkBuilder::new().build(),
			contract_address: Some(TEST_CONTRACT_ADDRESS.to_string()),
			retry: RetryPolicyConfig::default(),
			confirmation: ConfirmationConfig::default(),
			reconciliation: ReconciliationConfig::default(),
			storage_path: PathBuf::from("data/transactions"),
			verification_timeout_ms: None,
		}
	}
}

impl VerifierConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn network(mut self, network: Network) -> Self {
		self.network = network;
		self
	}

	pub fn contract_address(mut self, address: &str) -> Self {
		self.contract_address = Some(address.to_string());
		self
	}

	pub fn no_contract_address(mut self) -> Self {
		self.contract_address = None;
		self
	}

	/// Replaces the network's RPC URLs with `url`
	pub fn rpc_url(mut self, url: &str, weight: u32) -> Self {
		self.network.rpc_urls = vec![RpcUrl {
			type_: "rpc".to_string(),
			url: url.to_string(),
			weight,
		}];
		self
	}

	pub fn retry(mut self, max_attempts: u32, base_delay_ms: u64) -> Self {
		self.retry.max_attempts = max_attempts;
		self.retry.base_delay_ms = base_delay_ms;
		self
	}

	pub fn reconciliation(mut self, pending_horizon_secs: u64, batch_size: usize) -> Self {
		self.reconciliation.pending_horizon_secs = pending_horizon_secs;
		self.reconciliation.batch_size = batch_size;
		self
	}

	pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.storage_path = path.into();
		self
	}

	pub fn verification_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.verification_timeout_ms = Some(timeout_ms);
		self
	}

	pub fn build(self) -> VerifierConfig {
		VerifierConfig {
			network: self.network,
			contract_address: self.contract_address,
			retry: self.retry,
			confirmation: self.confirmation,
			reconciliation: self.reconciliation,
			storage_path: self.storage_path,
			verification_timeout_ms: self.verification_timeout_ms,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::ConfigLoader;

	#[test]
	fn test_default_config_is_valid() {
		let config = VerifierConfigBuilder::new().build();
		assert!(config.validate().is_ok());
		assert_eq!(config.retry.max_attempts, 5);
		assert_eq!(config.reconciliation.batch_size, 20);
	}

	#[test]
	fn test_overrides() {
		let config = VerifierConfigBuilder::new()
			.no_contract_address()
			.retry(3, 10)
			.reconciliation(60, 5)
			.verification_timeout_ms(1_000)
			.build();

		assert_eq!(config.contract_address, None);
		assert_eq!(config.retry.max_attempts, 3);
		assert_eq!(config.reconciliation.pending_horizon_secs, 60);
		assert_eq!(config.verification_timeout_ms, Some(1_000));
	}
}
