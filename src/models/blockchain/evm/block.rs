//! EVM block header data.

use alloy::primitives::{B256, U256, U64};
use serde::{Deserialize, Serialize};

/// Block as returned by `eth_getBlockByNumber` without full transactions.
///
/// Verification only needs the block timestamp, so the remaining header fields are
/// skipped on deserialization.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
	#[serde(default)]
	pub number: Option<U64>,
	#[serde(default)]
	pub hash: Option<B256>,
	#[serde(rename = "parentHash", default)]
	pub parent_hash: B256,
	/// Unix seconds
	pub timestamp: U256,
}

impl Block {
	pub fn number_u64(&self) -> Option<u64> {
		self.number.map(|n| n.to::<u64>())
	}

	pub fn timestamp_u64(&self) -> u64 {
		self.timestamp.saturating_to::<u64>()
	}
}
