//! Mock implementation of the JSON-RPC transport.

use mockall::mock;
use serde_json::{json, Value};

use onchain_poll_verifier::services::blockchain::{
	BlockchainTransport, RotatingTransport, TransportError,
};

// Mock implementation of an EVM transport client.
// Lets client tests script raw JSON-RPC responses per method.
mock! {
	pub EVMTransportClient {
		pub async fn send_raw_request(&self, method: &str, params: Option<Value>) -> Result<Value, TransportError>;
		pub async fn get_current_url(&self) -> String;
	}

	impl Clone for EVMTransportClient {
		fn clone(&self) -> Self;
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for MockEVMTransportClient {
	async fn get_current_url(&self) -> String {
		self.get_current_url().await
	}

	async fn send_raw_request(
		&self,
		method: &str,
		params: Option<Value>,
	) -> Result<Value, TransportError> {
		self.send_raw_request(method, params).await
	}
}

#[async_trait::async_trait]
impl RotatingTransport for MockEVMTransportClient {
	async fn try_connect(&self, _url: &str) -> Result<(), anyhow::Error> {
		Ok(())
	}

	async fn update_client(&self, _url: &str) -> Result<(), anyhow::Error> {
		Ok(())
	}
}

/// Wraps `result` in a JSON-RPC 2.0 success envelope
pub fn rpc_result(result: Value) -> Value {
	json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

/// JSON-RPC 2.0 error envelope
pub fn rpc_error(code: i64, message: &str) -> Value {
	json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })
}

/// Transport whose health check is a real POST to the candidate URL
#[derive(Clone, Default)]
pub struct ProbingTransport {
	client: reqwest::Client,
}

impl ProbingTransport {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait::async_trait]
impl BlockchainTransport for ProbingTransport {
	async fn get_current_url(&self) -> String {
		String::new()
	}

	async fn send_raw_request(
		&self,
		_method: &str,
		_params: Option<Value>,
	) -> Result<Value, TransportError> {
		Ok(Value::Null)
	}
}

#[async_trait::async_trait]
impl RotatingTransport for ProbingTransport {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		let response = self.client.post(url).json(&json!({})).send().await?;
		if !response.status().is_success() {
			anyhow::bail!("probe of {} answered {}", url, response.status());
		}
		Ok(())
	}

	async fn update_client(&self, _url: &str) -> Result<(), anyhow::Error> {
		Ok(())
	}
}

/// Transport that accepts connections but never lets the client switch URL
#[derive(Clone, Default)]
pub struct StuckTransport;

#[async_trait::async_trait]
impl BlockchainTransport for StuckTransport {
	async fn get_current_url(&self) -> String {
		String::new()
	}

	async fn send_raw_request(
		&self,
		_method: &str,
		_params: Option<Value>,
	) -> Result<Value, TransportError> {
		Ok(Value::Null)
	}
}

#[async_trait::async_trait]
impl RotatingTransport for StuckTransport {
	async fn try_connect(&self, _url: &str) -> Result<(), anyhow::Error> {
		Ok(())
	}

	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		anyhow::bail!("cannot switch to {}", url)
	}
}
