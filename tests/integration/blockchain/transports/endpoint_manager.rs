use mockito::Server;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::json;

use onchain_poll_verifier::services::blockchain::{EndpointManager, TransportError};

use crate::integration::mocks::{ProbingTransport, StuckTransport};

fn plain_client() -> ClientWithMiddleware {
	ClientBuilder::new(reqwest::Client::new()).build()
}

const RPC_OK: &str = r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#;

#[tokio::test]
async fn test_rotation_promotes_first_healthy_fallback() {
	let unreachable = Server::new_async().await;
	let mut broken = Server::new_async().await;
	let mut healthy = Server::new_async().await;

	let broken_probe = broken
		.mock("POST", "/")
		.with_status(503)
		.create_async()
		.await;
	let healthy_probe = healthy
		.mock("POST", "/")
		.with_status(200)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		plain_client(),
		&unreachable.url(),
		vec![broken.url(), healthy.url()],
	);

	let new_url = manager
		.try_rotate_url(&ProbingTransport::new())
		.await
		.unwrap();

	assert_eq!(new_url, healthy.url());
	assert_eq!(*manager.active_url.read().await, healthy.url());
	assert_eq!(
		*manager.fallback_urls.read().await,
		vec![broken.url(), unreachable.url()]
	);
	broken_probe.assert();
	healthy_probe.assert();
}

#[tokio::test]
async fn test_rotation_without_fallbacks_fails() {
	let server = Server::new_async().await;
	let manager = EndpointManager::new(plain_client(), &server.url(), vec![]);

	let result = manager.try_rotate_url(&ProbingTransport::new()).await;

	assert!(matches!(result, Err(TransportError::UrlRotation(_))));
	assert_eq!(*manager.active_url.read().await, server.url());
}

#[tokio::test]
async fn test_rotation_ignores_fallbacks_equal_to_active() {
	let server = Server::new_async().await;
	let manager = EndpointManager::new(plain_client(), &server.url(), vec![server.url()]);

	let result = manager.try_rotate_url(&ProbingTransport::new()).await;

	assert!(matches!(result, Err(TransportError::UrlRotation(_))));
}

#[tokio::test]
async fn test_rotation_fails_when_client_cannot_switch() {
	let primary = Server::new_async().await;
	let fallback = Server::new_async().await;
	let manager = EndpointManager::new(plain_client(), &primary.url(), vec![fallback.url()]);

	let result = manager.try_rotate_url(&StuckTransport).await;

	assert!(matches!(result, Err(TransportError::UrlRotation(_))));
	assert_eq!(*manager.active_url.read().await, primary.url());
}

#[tokio::test]
async fn test_send_raw_request_posts_json_rpc_body() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::Json(json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "eth_getTransactionReceipt",
			"params": ["0xabc"]
		})))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(RPC_OK)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &server.url(), vec![]);
	let response = manager
		.send_raw_request(
			&ProbingTransport::new(),
			"eth_getTransactionReceipt",
			Some(json!(["0xabc"])),
		)
		.await
		.unwrap();

	assert_eq!(response["result"], "0x1");
	mock.assert();
}

#[tokio::test]
async fn test_missing_params_default_to_empty_array() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({ "params": [] })))
		.with_status(200)
		.with_body(RPC_OK)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &server.url(), vec![]);
	manager
		.send_raw_request(&ProbingTransport::new(), "eth_blockNumber", None)
		.await
		.unwrap();

	mock.assert();
}

#[tokio::test]
async fn test_rate_limit_rotates_and_replays() {
	let mut primary = Server::new_async().await;
	let mut fallback = Server::new_async().await;

	let limited = primary
		.mock("POST", "/")
		.with_status(429)
		.with_body("Rate limited")
		.expect(1)
		.create_async()
		.await;
	// Probe plus the replayed request
	let served = fallback
		.mock("POST", "/")
		.with_status(200)
		.with_body(RPC_OK)
		.expect(2)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &primary.url(), vec![fallback.url()]);
	let response = manager
		.send_raw_request(&ProbingTransport::new(), "eth_blockNumber", None)
		.await
		.unwrap();

	assert_eq!(response["result"], "0x1");
	assert_eq!(*manager.active_url.read().await, fallback.url());
	limited.assert();
	served.assert();
}

#[tokio::test]
async fn test_rate_limit_everywhere_gives_up() {
	let mut primary = Server::new_async().await;
	let mut fallback = Server::new_async().await;

	primary
		.mock("POST", "/")
		.with_status(429)
		.create_async()
		.await;
	let fallback_mock = fallback
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(
			json!({ "method": "eth_blockNumber" }),
		))
		.with_status(429)
		.expect(1)
		.create_async()
		.await;
	fallback
		.mock("POST", "/")
		.match_body(mockito::Matcher::Json(json!({})))
		.with_status(200)
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &primary.url(), vec![fallback.url()]);
	let result = manager
		.send_raw_request(&ProbingTransport::new(), "eth_blockNumber", None)
		.await;

	match result {
		Err(TransportError::Http { status_code, .. }) => assert_eq!(status_code.as_u16(), 429),
		other => panic!("expected HTTP error, got {:?}", other),
	}
	fallback_mock.assert();
}

#[tokio::test]
async fn test_non_rotating_status_is_returned() {
	let mut primary = Server::new_async().await;
	let fallback = Server::new_async().await;

	primary
		.mock("POST", "/")
		.with_status(500)
		.with_body("boom")
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &primary.url(), vec![fallback.url()]);
	let result = manager
		.send_raw_request(&ProbingTransport::new(), "eth_blockNumber", None)
		.await;

	match result {
		Err(TransportError::Http {
			status_code, body, ..
		}) => {
			assert_eq!(status_code.as_u16(), 500);
			assert_eq!(body, "boom");
		}
		other => panic!("expected HTTP error, got {:?}", other),
	}
	assert_eq!(*manager.active_url.read().await, primary.url());
}

#[tokio::test]
async fn test_send_failure_rotates_to_fallback() {
	let mut fallback = Server::new_async().await;
	fallback
		.mock("POST", "/")
		.with_status(200)
		.with_body(RPC_OK)
		.create_async()
		.await;

	let manager = EndpointManager::new(
		plain_client(),
		"http://127.0.0.1:1",
		vec![fallback.url()],
	);
	let response = manager
		.send_raw_request(&ProbingTransport::new(), "eth_blockNumber", None)
		.await
		.unwrap();

	assert_eq!(response["result"], "0x1");
	assert_eq!(*manager.active_url.read().await, fallback.url());
}

#[tokio::test]
async fn test_send_failure_without_fallback_is_network_error() {
	let manager = EndpointManager::new(plain_client(), "http://127.0.0.1:1", vec![]);
	let result = manager
		.send_raw_request(&ProbingTransport::new(), "eth_blockNumber", None)
		.await;

	assert!(matches!(result, Err(TransportError::Network(_))));
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
	let mut server = Server::new_async().await;
	server
		.mock("POST", "/")
		.with_status(200)
		.with_body("not json")
		.create_async()
		.await;

	let manager = EndpointManager::new(plain_client(), &server.url(), vec![]);
	let result = manager
		.send_raw_request(&ProbingTransport::new(), "eth_blockNumber", None)
		.await;

	assert!(matches!(result, Err(TransportError::ResponseParse(_))));
}
