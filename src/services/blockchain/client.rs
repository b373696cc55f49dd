//! Read-only chain access used by verification and reconciliation.

use async_trait::async_trait;

use crate::{
	models::{EVMBlock, EVMTransaction, EVMTransactionReceipt},
	services::blockchain::BlockChainError,
};

/// Point lookups against an EVM node.
///
/// Lookups return `Ok(None)` when the node answers but does not know the object yet
/// (unknown hash, pending transaction, future block) and `Err` when the node could not
/// answer at all.
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Fetches a transaction by hash
	///
	/// # Arguments
	/// * `transaction_hash` - `0x`-prefixed 32-byte hash
	async fn get_transaction(
		&self,
		transaction_hash: &str,
	) -> Result<Option<EVMTransaction>, BlockChainError>;

	/// Fetches the receipt of a mined transaction
	///
	/// # Arguments
	/// * `transaction_hash` - `0x`-prefixed 32-byte hash
	async fn get_transaction_receipt(
		&self,
		transaction_hash: &str,
	) -> Result<Option<EVMTransactionReceipt>, BlockChainError>;

	/// Fetches a block header by number
	async fn get_block(&self, block_number: u64) -> Result<Option<EVMBlock>, BlockChainError>;

	/// Returns the height of the chain head
	async fn get_latest_block_number(&self) -> Result<u64, BlockChainError>;
}
