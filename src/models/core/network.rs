use serde::{Deserialize, Serialize};

use crate::utils::http::RetryConfig;

/// Connection settings for the chain the polls contract is deployed on.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Network {
	/// Unique identifier, e.g. `base_mainnet`
	pub slug: String,

	/// Human-readable name
	pub name: String,

	/// RPC endpoints, tried in descending weight order
	pub rpc_urls: Vec<RpcUrl>,

	/// EVM chain id, used to sanity check the connected node
	pub chain_id: Option<u64>,

	/// Blocks required before a transaction counts as final
	pub confirmation_blocks: u64,

	/// Transport-level retries applied to every RPC request
	#[serde(default)]
	pub http_retry: RetryConfig,
}

/// RPC endpoint with a load balancing weight
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RpcUrl {
	/// Endpoint kind; only `rpc` endpoints are used
	pub type_: String,

	pub url: String,

	/// 0 disables the endpoint
	pub weight: u32,
}
