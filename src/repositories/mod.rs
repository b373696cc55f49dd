//! Repository implementations for vote transaction records.
//!
//! - Record: trait plus file-backed and in-memory stores keyed by transaction hash

mod error;
mod record;

pub use error::RepositoryError;
pub use record::{
	FileTransactionRecordRepository, InMemoryTransactionRecordRepository,
	TransactionRecordRepositoryTrait,
};
