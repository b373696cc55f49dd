//! Mock implementation of the chain reader.

use async_trait::async_trait;
use mockall::mock;

use onchain_poll_verifier::{
	models::{EVMBlock, EVMTransaction, EVMTransactionReceipt},
	services::blockchain::{BlockChainError, ChainReader},
};

mock! {
	/// Chain reader whose answers are scripted per test
	pub ChainReader {}

	#[async_trait]
	impl ChainReader for ChainReader {
		async fn get_transaction(
			&self,
			transaction_hash: &str,
		) -> Result<Option<EVMTransaction>, BlockChainError>;

		async fn get_transaction_receipt(
			&self,
			transaction_hash: &str,
		) -> Result<Option<EVMTransactionReceipt>, BlockChainError>;

		async fn get_block(&self, block_number: u64) -> Result<Option<EVMBlock>, BlockChainError>;

		async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;
	}
}

/// Connection error as the EVM client would report it
pub fn node_unreachable() -> BlockChainError {
	BlockChainError::connection_error("eth_getTransactionByHash failed", None, None)
}
