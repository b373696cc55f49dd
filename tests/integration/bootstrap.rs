use mockito::{Matcher, Server};
use serde_json::json;
use std::{path::Path, sync::Arc};

use onchain_poll_verifier::{
	bootstrap::{initialize_services, parse_contract_address},
	models::{ConfigLoader, RecordStatus, VerificationError, VerifierConfig},
	services::notification::{NoopPollRefreshNotifier, PollRefreshNotifier},
	utils::tests::builders::{
		config::{VerifierConfigBuilder, TEST_CONTRACT_ADDRESS},
		network::NetworkBuilder,
	},
};

fn write_config(dir: &Path, config: &VerifierConfig) -> std::path::PathBuf {
	let path = dir.join("verifier.json");
	std::fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
	path
}

fn noop() -> Arc<dyn PollRefreshNotifier> {
	Arc::new(NoopPollRefreshNotifier)
}

#[tokio::test]
async fn test_services_share_one_chain_connection() {
	let mut server = Server::new_async().await;
	let health_mock = server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({ "method": "net_version" })))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":"1"}"#)
		.expect(1)
		.create_async()
		.await;
	server
		.mock("POST", "/")
		.match_body(Matcher::Regex("eth_getTransaction".to_string()))
		.with_status(200)
		.with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
		.create_async()
		.await;

	let dir = tempfile::tempdir().unwrap();
	let config = VerifierConfigBuilder::new()
		.network(
			NetworkBuilder::new()
				.rpc_url(&server.url())
				.without_http_retries()
				.build(),
		)
		.storage_path(dir.path().join("records"))
		.retry(1, 1)
		.build();
	let config_path = write_config(dir.path(), &config);

	let services = initialize_services(&config_path, noop()).await.unwrap();
	assert_eq!(services.config, config);
	assert_eq!(
		services.contract,
		Some(TEST_CONTRACT_ADDRESS.parse().unwrap())
	);

	let hash = format!("0x{}", "12".repeat(32));
	let record = services
		.reconciler
		.record_pending_vote(&hash, "vote-1", None, 1_000)
		.await
		.unwrap();
	assert_eq!(record.status, RecordStatus::Pending);
	assert!(dir.path().join("records").join(format!("{}.json", hash)).exists());

	let record = services
		.reconciler
		.check_transaction_status(&hash, 1_010)
		.await
		.unwrap();
	assert_eq!(record.status, RecordStatus::Pending);

	let parsed = services
		.verifier
		.verify_transaction_and_parse_events(&hash, services.contract.as_ref())
		.await;
	assert_eq!(parsed, Err(VerificationError::NotFoundAfterRetries(1)));

	health_mock.assert();
}

#[tokio::test]
async fn test_unreachable_network_fails_startup() {
	let dir = tempfile::tempdir().unwrap();
	let config = VerifierConfigBuilder::new()
		.network(
			NetworkBuilder::new()
				.rpc_url("http://127.0.0.1:1")
				.without_http_retries()
				.build(),
		)
		.storage_path(dir.path().join("records"))
		.build();
	let config_path = write_config(dir.path(), &config);

	let result = initialize_services(&config_path, noop()).await;
	assert!(result.is_err());
}

#[tokio::test]
async fn test_invalid_contract_fails_before_connecting() {
	let mut server = Server::new_async().await;
	let health_mock = server
		.mock("POST", "/")
		.with_status(200)
		.expect(0)
		.create_async()
		.await;

	let dir = tempfile::tempdir().unwrap();
	let config = VerifierConfigBuilder::new()
		.rpc_url(&server.url(), 100)
		.contract_address("0x1234")
		.build();
	let config_path = write_config(dir.path(), &config);

	assert!(initialize_services(&config_path, noop()).await.is_err());
	health_mock.assert();
}

#[tokio::test]
async fn test_config_file_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let config = VerifierConfigBuilder::new()
		.reconciliation(600, 5)
		.verification_timeout_ms(30_000)
		.build();
	let config_path = write_config(dir.path(), &config);

	let loaded = VerifierConfig::load_from_path(&config_path).await.unwrap();

	assert_eq!(loaded, config);
	assert!(parse_contract_address(&loaded).unwrap().is_some());
}

#[tokio::test]
async fn test_unknown_config_fields_are_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("verifier.json");
	let mut raw = serde_json::to_value(VerifierConfigBuilder::new().build()).unwrap();
	raw["retry"]["max_attemps"] = json!(3);
	std::fs::write(&path, raw.to_string()).unwrap();

	assert!(VerifierConfig::load_from_path(&path).await.is_err());
}
