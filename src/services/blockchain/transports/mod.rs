//! JSON-RPC transport over HTTP with endpoint failover.

mod endpoint_manager;
mod error;
mod http;

pub use endpoint_manager::EndpointManager;
pub use error::TransportError;
pub use http::HttpTransportClient;

use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde_json::{json, Value};

/// HTTP statuses that make the endpoint manager switch to a fallback URL
pub const ROTATE_ON_ERROR_CODES: [u16; 1] = [429];

/// Sends JSON-RPC requests to a chain node
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// URL requests are currently sent to
	async fn get_current_url(&self) -> String;

	/// Sends `method` with `params` and returns the full JSON-RPC response object
	async fn send_raw_request(
		&self,
		method: &str,
		params: Option<Value>,
	) -> Result<Value, TransportError>;

	/// Builds the request body; JSON-RPC 2.0 by default
	fn customize_request(&self, method: &str, params: Option<Value>) -> Value {
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.unwrap_or_else(|| json!([])),
		})
	}
}

/// Transports able to move to another endpoint
#[async_trait::async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Checks that `url` answers a health-check request
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error>;

	/// Points subsequent requests at `url`
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error>;
}

/// Retries what reqwest-retry considers transient, for both responses and send errors
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}
