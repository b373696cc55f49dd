//! Domain models for onchain poll verification.
//!
//! - `blockchain`: EVM wire types (transactions, receipts, logs, blocks)
//! - `config`: Verifier configuration loading and validation
//! - `core`: Decoded events, verification verdicts and vote transaction records

mod blockchain;
mod config;
mod core;

pub use blockchain::evm::{
	EVMBlock, EVMReceiptLog, EVMTransaction, EVMTransactionReceipt, TransactionStatus,
};

pub use config::{
	ConfigError, ConfigLoader, ConfirmationConfig, ReconciliationConfig, RetryPolicyConfig,
	VerifierConfig, DEFAULT_CONFIG_PATH,
};

pub use core::{
	normalize_hash, ConfirmationStatus, DecodedCall, DecodedEvent, EventKind, Network,
	ParsedTransaction, PollCreatedEvent, PollCreationClaim, RecordResolution, RecordStatus, RpcUrl,
	SweepEntry, SweepOutcome, SweepReport, TransactionMeta, TransactionVerification,
	VerificationData, VerificationError, VerificationResult, VoteCastEvent, VoteClaim,
	VoteTransactionRecord,
};
