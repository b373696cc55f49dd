use serde::{Deserialize, Serialize};

use crate::models::{TransactionMeta, VoteClaim};

/// Lifecycle of a vote transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
	Pending,
	Confirmed,
	Failed,
}

impl RecordStatus {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::Pending)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Confirmed => "confirmed",
			Self::Failed => "failed",
		}
	}
}

impl std::fmt::Display for RecordStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Persisted link between a vote and the transaction that is supposed to prove it.
///
/// Records are never deleted and leave `pending` at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTransactionRecord {
	/// Unique key, lowercase `0x` hex
	pub transaction_hash: String,
	pub vote_id: String,
	pub status: RecordStatus,
	pub block_number: Option<u64>,
	pub block_hash: Option<String>,
	pub gas_used: Option<u64>,
	/// Unix seconds at which the record left `pending`
	pub verified_at: Option<i64>,
	/// Unix seconds
	pub created_at: i64,
	/// Vote the transaction is expected to carry
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub claim: Option<VoteClaim>,
	/// Verdict message for failed records
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub failure_reason: Option<String>,
}

impl VoteTransactionRecord {
	/// Record for a vote accepted before its transaction was verified
	pub fn pending(
		transaction_hash: impl Into<String>,
		vote_id: impl Into<String>,
		claim: Option<VoteClaim>,
		created_at: i64,
	) -> Self {
		Self {
			transaction_hash: normalize_hash(&transaction_hash.into()),
			vote_id: vote_id.into(),
			status: RecordStatus::Pending,
			block_number: None,
			block_hash: None,
			gas_used: None,
			verified_at: None,
			created_at,
			claim,
			failure_reason: None,
		}
	}

	/// Record for a vote whose transaction was verified at submission
	pub fn confirmed(
		meta: &TransactionMeta,
		vote_id: impl Into<String>,
		claim: Option<VoteClaim>,
		verified_at: i64,
	) -> Self {
		let mut record = Self::pending(&meta.transaction_hash, vote_id, claim, verified_at);
		record.apply(&RecordResolution::confirmed(meta, verified_at));
		record
	}

	/// Copies a resolution onto the record
	pub fn apply(&mut self, resolution: &RecordResolution) {
		self.status = resolution.status;
		self.block_number = resolution.block_number;
		self.block_hash = resolution.block_hash.clone();
		self.gas_used = resolution.gas_used;
		self.verified_at = Some(resolution.verified_at);
		self.failure_reason = resolution.failure_reason.clone();
	}
}

/// Terminal state computed by reconciliation for a pending record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResolution {
	pub status: RecordStatus,
	pub block_number: Option<u64>,
	pub block_hash: Option<String>,
	pub gas_used: Option<u64>,
	pub verified_at: i64,
	pub failure_reason: Option<String>,
}

impl RecordResolution {
	pub fn confirmed(meta: &TransactionMeta, verified_at: i64) -> Self {
		Self {
			status: RecordStatus::Confirmed,
			block_number: Some(meta.block_number),
			block_hash: meta.block_hash.clone(),
			gas_used: Some(meta.gas_used),
			verified_at,
			failure_reason: None,
		}
	}

	pub fn failed(meta: &TransactionMeta, reason: impl Into<String>, verified_at: i64) -> Self {
		Self {
			status: RecordStatus::Failed,
			failure_reason: Some(reason.into()),
			..Self::confirmed(meta, verified_at)
		}
	}
}

/// Lowercases a `0x` hash so it can be used as a storage key
pub fn normalize_hash(hash: &str) -> String {
	hash.trim().to_lowercase()
}

/// Outcome of reconciling one record during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOutcome {
	Confirmed,
	Failed,
	StillPending,
	Error,
}

/// Per-record line of a sweep report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepEntry {
	pub transaction_hash: String,
	pub vote_id: String,
	pub outcome: SweepOutcome,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

/// Summary of one sweep over pending records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
	pub total_pending: usize,
	pub processed: usize,
	pub confirmed: usize,
	pub failed: usize,
	pub still_pending: usize,
	pub errors: usize,
	pub results: Vec<SweepEntry>,
}

impl SweepReport {
	pub fn push(&mut self, entry: SweepEntry) {
		self.processed += 1;
		match entry.outcome {
			SweepOutcome::Confirmed => self.confirmed += 1,
			SweepOutcome::Failed => self.failed += 1,
			SweepOutcome::StillPending => self.still_pending += 1,
			SweepOutcome::Error => self.errors += 1,
		}
		self.results.push(entry);
	}
}
