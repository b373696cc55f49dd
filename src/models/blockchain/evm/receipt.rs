//! EVM receipt data structures.
//!
//! Only the receipt attributes consumed by verification are modelled; unknown
//! JSON-RPC fields are ignored on deserialization.

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// Log entry emitted by a transaction
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLog {
	/// Contract that emitted the log
	pub address: Address,
	/// Topic 0 is the event selector for non-anonymous events
	pub topics: Vec<B256>,
	/// ABI-encoded non-indexed parameters
	pub data: Bytes,
	#[serde(rename = "logIndex", default, skip_serializing_if = "Option::is_none")]
	pub log_index: Option<U64>,
}

/// Execution outcome reported by the receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
	Success,
	Failure,
}

impl std::fmt::Display for TransactionStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Success => f.write_str("success"),
			Self::Failure => f.write_str("failure"),
		}
	}
}

/// Transaction receipt as returned by `eth_getTransactionReceipt`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	#[serde(rename = "transactionHash")]
	pub transaction_hash: B256,
	#[serde(rename = "blockHash", default)]
	pub block_hash: Option<B256>,
	#[serde(rename = "blockNumber", default)]
	pub block_number: Option<U64>,
	#[serde(default)]
	pub from: Address,
	/// Destination; `None` for contract creation
	#[serde(default)]
	pub to: Option<Address>,
	#[serde(rename = "gasUsed", default)]
	pub gas_used: Option<U256>,
	/// 1 for success, 0 for failure (post-Byzantium)
	#[serde(default)]
	pub status: Option<U64>,
	#[serde(default)]
	pub logs: Vec<ReceiptLog>,
}

impl TransactionReceipt {
	/// Execution status; a missing status field is treated as failure.
	pub fn status(&self) -> TransactionStatus {
		match self.status {
			Some(status) if status == U64::from(1) => TransactionStatus::Success,
			_ => TransactionStatus::Failure,
		}
	}

	pub fn is_success(&self) -> bool {
		self.status() == TransactionStatus::Success
	}

	pub fn block_number_u64(&self) -> Option<u64> {
		self.block_number.map(|n| n.to::<u64>())
	}

	/// Gas used, saturating at `u64::MAX`
	pub fn gas_used_u64(&self) -> u64 {
		self.gas_used
			.map(|gas| gas.saturating_to::<u64>())
			.unwrap_or_default()
	}
}
