//! EVM transaction data structures.

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// Transaction as returned by `eth_getTransactionByHash`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
	pub hash: B256,
	#[serde(default)]
	pub from: Address,
	#[serde(default)]
	pub to: Option<Address>,
	/// Calldata
	#[serde(default)]
	pub input: Bytes,
	#[serde(default)]
	pub value: U256,
	/// `None` while the transaction is pending
	#[serde(rename = "blockNumber", default)]
	pub block_number: Option<U64>,
	#[serde(rename = "blockHash", default)]
	pub block_hash: Option<B256>,
}

impl Transaction {
	pub fn is_mined(&self) -> bool {
		self.block_number.is_some()
	}
}
