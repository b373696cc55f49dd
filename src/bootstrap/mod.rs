//! Bootstrap module for wiring services from a [`VerifierConfig`].
//!
//! The chain client is built once and shared through an `Arc<dyn ChainReader>`; every
//! service receives it explicitly.
//!
//! # Services
//! - `VerificationService`: Poll creation and vote verification
//! - `ReconciliationService`: Vote record lifecycle backed by the file record store

use alloy::primitives::Address;
use std::{collections::HashMap, error::Error, path::Path, sync::Arc, time::Duration};

use crate::{
	models::{ConfigError, VerifierConfig},
	repositories::FileTransactionRecordRepository,
	services::{
		blockchain::{ChainReader, EvmClient},
		notification::PollRefreshNotifier,
		reconciliation::{ReconciliationService, ReconciliationSettings},
		retry::{ConfirmationPolicy, RetryPolicy},
		verification::VerificationService,
	},
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Verification service over the shared chain reader
pub type Verifier = VerificationService<dyn ChainReader>;

/// Reconciliation service as wired by [`initialize_services`]
pub type Reconciler =
	ReconciliationService<dyn ChainReader, FileTransactionRecordRepository, dyn PollRefreshNotifier>;

/// Everything the CLI needs to serve a command
pub struct Services {
	pub config: VerifierConfig,
	pub contract: Option<Address>,
	pub verifier: Verifier,
	pub reconciler: Reconciler,
}

/// Parses the configured polls contract address.
///
/// # Returns
/// * `Ok(None)` - No contract configured; address checks are skipped
pub fn parse_contract_address(
	config: &VerifierConfig,
) -> std::result::Result<Option<Address>, ConfigError> {
	config
		.contract_address
		.as_deref()
		.map(|address| {
			address.parse::<Address>().map_err(|e| {
				ConfigError::validation_error(
					format!("Invalid contract address: {}", e),
					Some(Box::new(e)),
					Some(HashMap::from([(
						"contract_address".to_string(),
						address.to_string(),
					)])),
				)
			})
		})
		.transpose()
}

/// Connects to the configured network.
pub async fn create_chain_reader(config: &VerifierConfig) -> Result<Arc<dyn ChainReader>> {
	let client = EvmClient::new(&config.network).await?;
	Ok(Arc::new(client))
}

/// Builds the verification service from the retry, confirmation and timeout settings.
pub fn create_verification_service<C: ChainReader + ?Sized>(
	config: &VerifierConfig,
	reader: Arc<C>,
) -> VerificationService<C> {
	VerificationService::new(reader, RetryPolicy::from(&config.retry))
		.with_confirmation_policy(ConfirmationPolicy::from(&config.confirmation))
		.with_verification_timeout(config.verification_timeout_ms.map(Duration::from_millis))
}

/// Loads the configuration, connects to the chain and wires every service.
///
/// # Arguments
/// * `config_path` - JSON configuration file
/// * `notifier` - Receives poll ids whose tally changed
///
/// # Errors
/// Returns an error if the configuration is invalid, no RPC endpoint is reachable or the
/// record storage directory cannot be created
pub async fn initialize_services(
	config_path: &Path,
	notifier: Arc<dyn PollRefreshNotifier>,
) -> Result<Services> {
	let config = VerifierConfig::load(config_path).await?;
	let contract = parse_contract_address(&config)?;
	let reader = create_chain_reader(&config).await?;

	let verifier = create_verification_service(&config, reader);
	let repository = FileTransactionRecordRepository::new(&config.storage_path).await?;
	let reconciler = ReconciliationService::new(
		verifier.clone(),
		repository,
		notifier,
		contract,
		ReconciliationSettings::from(&config.reconciliation),
	);

	Ok(Services {
		config,
		contract,
		verifier,
		reconciler,
	})
}
