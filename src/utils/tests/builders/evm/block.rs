use crate::models::EVMBlock;
use alloy::primitives::{B256, U256, U64};

/// A builder for creating test block headers.
#[derive(Debug)]
pub struct BlockBuilder {
	number: u64,
	timestamp: u64,
}

impl Default for BlockBuilder {
	fn default() -> Self {
		Self {
			number: 100,
			timestamp: 1_700_000_000,
		}
	}
}

impl BlockBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn number(mut self, number: u64) -> Self {
		self.number = number;
		self
	}

	/// Unix seconds
	pub fn timestamp(mut self, timestamp: u64) -> Self {
		self.timestamp = timestamp;
		self
	}

	pub fn build(self) -> EVMBlock {
		EVMBlock {
			number: Some(U64::from(self.number)),
			hash: Some(B256::repeat_byte(0xbb)),
			parent_hash: B256::repeat_byte(0xaa),
			timestamp: U256::from(self.timestamp),
		}
	}
}
