mod block;
mod receipt;
mod transaction;

pub use block::Block as EVMBlock;
pub use receipt::{
	ReceiptLog as EVMReceiptLog, TransactionReceipt as EVMTransactionReceipt, TransactionStatus,
};
pub use transaction::Transaction as EVMTransaction;
