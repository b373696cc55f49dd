//! JSON-RPC backed [`ChainReader`] for EVM chains.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::instrument;

use crate::{
	models::{EVMBlock, EVMTransaction, EVMTransactionReceipt, Network},
	services::blockchain::{
		client::ChainReader,
		transports::{BlockchainTransport, HttpTransportClient},
		BlockChainError,
	},
	utils::parsing::parse_hex_quantity,
};

/// EVM node client over any [`BlockchainTransport`]
#[derive(Clone)]
pub struct EvmClient<T: Send + Sync> {
	transport: T,
}

impl<T: Send + Sync> EvmClient<T> {
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}
}

impl EvmClient<HttpTransportClient> {
	/// Connects to `network` and, when the network pins a chain id, checks the node serves it.
	///
	/// # Arguments
	/// * `network` - Network configuration with RPC endpoints
	///
	/// # Returns
	/// * `Result<Self, anyhow::Error>` - Error when no endpoint is reachable or the chain id differs
	pub async fn new(network: &Network) -> Result<Self, anyhow::Error> {
		let transport = HttpTransportClient::new(network, None).await?;
		let client = Self::new_with_transport(transport);

		if let Some(expected) = network.chain_id {
			let actual = client.get_chain_id().await?;
			if actual != expected {
				anyhow::bail!(
					"RPC endpoint for '{}' serves chain id {} but {} is configured",
					network.slug,
					actual,
					expected
				);
			}
		}

		Ok(client)
	}
}

impl<T: Send + Sync + BlockchainTransport> EvmClient<T> {
	/// Sends `method` and returns the `result` member, `Value::Null` included.
	async fn call(&self, method: &str, params: Value) -> Result<Value, BlockChainError> {
		let metadata = || HashMap::from([("method".to_string(), method.to_string())]);

		let mut response = self
			.transport
			.send_raw_request(method, Some(params))
			.await
			.map_err(|e| {
				BlockChainError::connection_error(
					format!("{} failed", method),
					Some(Box::new(e)),
					Some(metadata()),
				)
			})?;

		if let Some(error) = response.get("error") {
			let message = error
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or("unknown error");
			return Err(BlockChainError::request_error(
				format!("node rejected {}: {}", method, message),
				None,
				Some(metadata()),
			));
		}

		response
			.get_mut("result")
			.map(Value::take)
			.ok_or_else(|| {
				BlockChainError::request_error("Missing 'result' field", None, Some(metadata()))
			})
	}

	/// Like [`Self::call`] but deserializes the result, mapping JSON `null` to `None`.
	async fn call_optional<R: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
	) -> Result<Option<R>, BlockChainError> {
		let result = self.call(method, params).await?;
		if result.is_null() {
			return Ok(None);
		}

		serde_json::from_value(result).map(Some).map_err(|e| {
			BlockChainError::request_error(
				format!("Failed to parse {} result", method),
				Some(Box::new(e)),
				None,
			)
		})
	}

	async fn call_quantity(&self, method: &str) -> Result<u64, BlockChainError> {
		let result = self.call(method, json!([])).await?;
		let quantity = result.as_str().ok_or_else(|| {
			BlockChainError::request_error(format!("{} returned a non-string", method), None, None)
		})?;

		parse_hex_quantity(quantity).map_err(|e| {
			BlockChainError::request_error(
				format!("{} returned an invalid quantity '{}'", method, quantity),
				Some(Box::new(e)),
				None,
			)
		})
	}

	/// Returns the chain id reported by the node
	#[instrument(skip(self))]
	pub async fn get_chain_id(&self) -> Result<u64, BlockChainError> {
		self.call_quantity("eth_chainId").await
	}
}

#[async_trait]
impl<T: Send + Sync + BlockchainTransport> ChainReader for EvmClient<T> {
	#[instrument(skip(self))]
	async fn get_transaction(
		&self,
		transaction_hash: &str,
	) -> Result<Option<EVMTransaction>, BlockChainError> {
		self.call_optional("eth_getTransactionByHash", json!([transaction_hash]))
			.await
	}

	#[instrument(skip(self))]
	async fn get_transaction_receipt(
		&self,
		transaction_hash: &str,
	) -> Result<Option<EVMTransactionReceipt>, BlockChainError> {
		self.call_optional("eth_getTransactionReceipt", json!([transaction_hash]))
			.await
	}

	#[instrument(skip(self))]
	async fn get_block(&self, block_number: u64) -> Result<Option<EVMBlock>, BlockChainError> {
		self.call_optional(
			"eth_getBlockByNumber",
			json!([format!("0x{:x}", block_number), false]),
		)
		.await
	}

	#[instrument(skip(self))]
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError> {
		self.call_quantity("eth_blockNumber").await
	}
}
