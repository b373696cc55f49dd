//! HTTP JSON-RPC transport for EVM nodes.
//!
//! Endpoints are probed in descending weight order at construction; the first that answers
//! becomes active and the rest are kept as fallbacks.

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::{
	models::Network,
	services::blockchain::transports::{
		BlockchainTransport, EndpointManager, RotatingTransport, TransientErrorRetryStrategy,
		TransportError,
	},
	utils::http::create_retryable_http_client,
};

/// Retryable HTTP client bound to a network's RPC endpoints
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	pub client: ClientWithMiddleware,
	endpoint_manager: EndpointManager,
	health_check: Value,
}

fn default_health_check() -> Value {
	json!({
		"jsonrpc": "2.0",
		"id": 1,
		"method": "net_version",
		"params": []
	})
}

impl HttpTransportClient {
	/// Connects to the highest-weighted reachable endpoint of `network`.
	///
	/// # Arguments
	/// * `network` - Network whose `rpc_urls` and `http_retry` settings are used
	/// * `health_check` - JSON-RPC request used to probe endpoints; `net_version` when `None`
	///
	/// # Returns
	/// * `Result<Self, anyhow::Error>` - Error when no endpoint answers
	pub async fn new(network: &Network, health_check: Option<Value>) -> Result<Self, anyhow::Error> {
		let mut endpoints: Vec<_> = network
			.rpc_urls
			.iter()
			.filter(|rpc_url| rpc_url.type_ == "rpc" && rpc_url.weight > 0)
			.collect();
		endpoints.sort_by(|a, b| b.weight.cmp(&a.weight));

		let base_client = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(Duration::from_secs(30))
			.connect_timeout(Duration::from_secs(20))
			.build()
			.context("Failed to create base HTTP client")?;

		let client = create_retryable_http_client(
			&network.http_retry,
			base_client,
			Some(TransientErrorRetryStrategy),
		);
		let health_check = health_check.unwrap_or_else(default_health_check);

		for endpoint in endpoints.iter() {
			if let Err(e) = probe(&client, &endpoint.url, &health_check).await {
				tracing::warn!(url = %endpoint.url, error = %e, "skipping unreachable RPC endpoint");
				continue;
			}

			let fallback_urls = endpoints
				.iter()
				.filter(|other| other.url != endpoint.url)
				.map(|other| other.url.clone())
				.collect();

			tracing::info!(network = %network.slug, url = %endpoint.url, "connected to RPC endpoint");
			return Ok(Self {
				client: client.clone(),
				endpoint_manager: EndpointManager::new(client, &endpoint.url, fallback_urls),
				health_check,
			});
		}

		Err(anyhow::anyhow!(
			"No RPC URL of network '{}' accepted a connection",
			network.slug
		))
	}
}

async fn probe(
	client: &ClientWithMiddleware,
	url: &str,
	health_check: &Value,
) -> Result<(), anyhow::Error> {
	let url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
	let response = client
		.post(url.clone())
		.json(health_check)
		.send()
		.await
		.with_context(|| format!("Failed to connect to {}", url))?;

	if !response.status().is_success() {
		anyhow::bail!("Failed to connect to {}: {}", url, response.status().as_u16());
	}
	Ok(())
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	async fn send_raw_request(
		&self,
		method: &str,
		params: Option<Value>,
	) -> Result<Value, TransportError> {
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		probe(&self.client, url, &self.health_check).await
	}

	/// The endpoint manager owns the active URL, so only the URL shape is checked here
	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
		Ok(())
	}
}
