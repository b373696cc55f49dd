use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::models::{
	DecodedCall, DecodedEvent, EVMTransaction, EVMTransactionReceipt, EventKind,
	TransactionStatus,
};

/// Reason a transaction was not accepted as proof of the claimed event.
///
/// These are verdicts rather than failures of the verifier itself: they are returned
/// inside a [`VerificationResult`] and the caller decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
	#[error("Invalid transaction hash format")]
	InvalidHashFormat,

	#[error("Blockchain unavailable: {0}")]
	ChainUnavailable(String),

	#[error("Transaction not found after {0} attempts")]
	NotFoundAfterRetries(u32),

	#[error("Transaction failed or reverted")]
	TransactionReverted,

	#[error("Transaction sent to wrong contract: expected {expected}, got {actual}")]
	WrongContract { expected: String, actual: String },

	#[error("{0} event not found in transaction")]
	EventNotFound(EventKind),

	#[error("{field} mismatch: expected {expected}, got {actual}")]
	FieldMismatch {
		field: &'static str,
		expected: String,
		actual: String,
	},

	#[error("Confirmation not reached within {0}ms")]
	ConfirmationTimeout(u64),
}

impl VerificationError {
	pub fn field_mismatch(
		field: &'static str,
		expected: impl ToString,
		actual: impl ToString,
	) -> Self {
		Self::FieldMismatch {
			field,
			expected: expected.to_string(),
			actual: actual.to_string(),
		}
	}

	/// HTTP status a route handler would answer with for this verdict
	pub fn status_code(&self) -> u16 {
		match self {
			Self::ChainUnavailable(_) | Self::ConfirmationTimeout(_) => 503,
			_ => 400,
		}
	}

	/// True when the chain data itself contradicts the claim.
	///
	/// Only these verdicts may move a pending record to `failed`; everything else
	/// could still resolve on a later check.
	pub fn is_definitive(&self) -> bool {
		matches!(
			self,
			Self::TransactionReverted
				| Self::WrongContract { .. }
				| Self::EventNotFound(_)
				| Self::FieldMismatch { .. }
		)
	}
}

/// Receipt metadata produced by the retry engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMeta {
	pub transaction_hash: String,
	pub block_number: u64,
	pub block_hash: Option<String>,
	pub status: TransactionStatus,
	pub gas_used: u64,
	/// 1 once the receipt carries a block number
	pub confirmations: u64,
}

impl TransactionMeta {
	pub fn from_parts(transaction: &EVMTransaction, receipt: &EVMTransactionReceipt) -> Self {
		let block_number = receipt.block_number_u64();
		Self {
			transaction_hash: format!("{:#x}", transaction.hash),
			block_number: block_number.unwrap_or_default(),
			block_hash: receipt.block_hash.map(|hash| format!("{:#x}", hash)),
			status: receipt.status(),
			gas_used: receipt.gas_used_u64(),
			confirmations: u64::from(block_number.is_some()),
		}
	}
}

/// Transaction and receipt found by the retry engine
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionVerification {
	/// Receipt reports successful execution
	pub verified: bool,
	pub transaction: TransactionMeta,
	pub receipt: EVMTransactionReceipt,
	/// Calldata of the transaction
	pub input: Bytes,
}

/// Confirmation depth reached by a mined transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationStatus {
	pub confirmed: bool,
	pub block_number: u64,
	pub confirmations: u64,
	pub status: TransactionStatus,
}

/// Poll the caller claims the transaction created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCreationClaim {
	pub poll_id: String,
	pub creator_fid: u64,
	pub duration_days: u64,
	pub option_count: u8,
}

/// Vote the caller claims the transaction cast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteClaim {
	pub poll_id: String,
	pub voter_fid: u64,
	pub option_index: u8,
}

/// Matched event plus the receipt metadata of the verified transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationData {
	#[serde(flatten)]
	pub event: DecodedEvent,
	pub transaction_hash: String,
	pub block_number: u64,
	pub block_hash: Option<String>,
	pub gas_used: u64,
}

impl VerificationData {
	pub fn new(event: DecodedEvent, meta: &TransactionMeta) -> Self {
		Self {
			event,
			transaction_hash: meta.transaction_hash.clone(),
			block_number: meta.block_number,
			block_hash: meta.block_hash.clone(),
			gas_used: meta.gas_used,
		}
	}
}

/// Verdict of a single verification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
	pub verified: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<VerificationData>,
	#[serde(
		skip_serializing_if = "Option::is_none",
		serialize_with = "serialize_error_message"
	)]
	pub error: Option<VerificationError>,
}

fn serialize_error_message<S: Serializer>(
	error: &Option<VerificationError>,
	serializer: S,
) -> Result<S::Ok, S::Error> {
	match error {
		Some(error) => serializer.serialize_str(&error.to_string()),
		None => serializer.serialize_none(),
	}
}

impl VerificationResult {
	pub fn verified(data: VerificationData) -> Self {
		Self {
			verified: true,
			data: Some(data),
			error: None,
		}
	}

	pub fn rejected(error: VerificationError) -> Self {
		Self {
			verified: false,
			data: None,
			error: Some(error),
		}
	}

	pub fn into_result(self) -> Result<VerificationData, VerificationError> {
		match (self.data, self.error) {
			(Some(data), None) if self.verified => Ok(data),
			(_, Some(error)) => Err(error),
			_ => Err(VerificationError::TransactionReverted),
		}
	}
}

impl From<Result<VerificationData, VerificationError>> for VerificationResult {
	fn from(result: Result<VerificationData, VerificationError>) -> Self {
		match result {
			Ok(data) => Self::verified(data),
			Err(error) => Self::rejected(error),
		}
	}
}

/// Every recognised event and the decoded call of a transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
	pub verified: bool,
	pub transaction: TransactionMeta,
	pub events: Vec<DecodedEvent>,
	pub call: Option<DecodedCall>,
}
