//! Vote record reconciliation.
//!
//! Votes can be accepted before their transaction is visible on chain. Such votes get a
//! `pending` record which is later moved to `confirmed` or `failed` by a single,
//! non-retried chain lookup, either inline when somebody asks for its status or in
//! bounded sweeps over recent pending records.

use alloy::primitives::Address;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{
		RecordResolution, RecordStatus, ReconciliationConfig, SweepEntry, SweepOutcome,
		SweepReport, TransactionMeta, TransactionStatus, VerificationData, VerificationError,
		VoteClaim, VoteTransactionRecord,
	},
	repositories::TransactionRecordRepositoryTrait,
	services::{
		blockchain::ChainReader,
		notification::PollRefreshNotifier,
		reconciliation::ReconciliationError,
		retry::fetch_once,
		verification::{match_vote, VerificationService},
	},
	utils::{
		is_valid_transaction_hash,
		metrics::{PENDING_RECORDS, RECONCILIATION_TRANSITIONS_TOTAL},
	},
};

/// Default age after which pending records are no longer swept
pub const DEFAULT_PENDING_HORIZON: Duration = Duration::from_secs(3600);

/// Default number of records checked per sweep
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Which pending records a sweep looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationSettings {
	pub pending_horizon: Duration,
	pub batch_size: usize,
}

impl Default for ReconciliationSettings {
	fn default() -> Self {
		Self {
			pending_horizon: DEFAULT_PENDING_HORIZON,
			batch_size: DEFAULT_BATCH_SIZE,
		}
	}
}

impl From<&ReconciliationConfig> for ReconciliationSettings {
	fn from(config: &ReconciliationConfig) -> Self {
		Self {
			pending_horizon: Duration::from_secs(config.pending_horizon_secs),
			batch_size: config.batch_size,
		}
	}
}

/// Result of one single-attempt chain check
#[derive(Debug, Clone, PartialEq)]
enum CheckOutcome {
	Resolved(RecordResolution),
	StillPending(String),
	/// Chain error; the record must stay pending
	Unavailable(String),
}

/// Creates vote records and drives pending ones to a terminal status
pub struct ReconciliationService<C, R, N>
where
	C: ChainReader + ?Sized,
	R: TransactionRecordRepositoryTrait,
	N: PollRefreshNotifier + ?Sized,
{
	verifier: VerificationService<C>,
	repository: R,
	notifier: Arc<N>,
	contract: Option<Address>,
	settings: ReconciliationSettings,
}

impl<C, R, N> ReconciliationService<C, R, N>
where
	C: ChainReader + ?Sized,
	R: TransactionRecordRepositoryTrait,
	N: PollRefreshNotifier + ?Sized,
{
	/// Creates a new reconciliation service.
	///
	/// # Arguments
	/// * `verifier` - Used for synchronous vote verification at submission
	/// * `repository` - Record store
	/// * `notifier` - Told about polls whose tally changed
	/// * `contract` - Polls contract the votes must target, if known
	/// * `settings` - Sweep horizon and batch size
	pub fn new(
		verifier: VerificationService<C>,
		repository: R,
		notifier: Arc<N>,
		contract: Option<Address>,
		settings: ReconciliationSettings,
	) -> Self {
		Self {
			verifier,
			repository,
			notifier,
			contract,
			settings,
		}
	}

	pub fn repository(&self) -> &R {
		&self.repository
	}

	pub fn settings(&self) -> &ReconciliationSettings {
		&self.settings
	}

	/// Verifies the vote transaction and stores a `confirmed` record.
	///
	/// # Errors
	/// * `VerificationFailed` - The transaction does not prove the vote; nothing is stored
	/// * `DuplicateTransaction` - The hash is already recorded
	#[instrument(skip(self, claim), fields(poll_id = %claim.poll_id))]
	pub async fn record_verified_vote(
		&self,
		transaction_hash: &str,
		vote_id: &str,
		claim: &VoteClaim,
		now: i64,
	) -> Result<VoteTransactionRecord, ReconciliationError> {
		let data = self
			.verifier
			.verify_vote_transaction(transaction_hash, claim, self.contract.as_ref())
			.await
			.into_result()
			.map_err(ReconciliationError::VerificationFailed)?;

		let record = VoteTransactionRecord::confirmed(
			&confirmed_meta(&data),
			vote_id,
			Some(claim.clone()),
			now,
		);
		let record = self.repository.create(record).await?;

		RECONCILIATION_TRANSITIONS_TOTAL
			.with_label_values(&[RecordStatus::Confirmed.as_str()])
			.inc();
		self.notifier.notify_poll_changed(&claim.poll_id);
		tracing::info!(
			transaction_hash = %record.transaction_hash,
			%vote_id,
			"vote recorded as confirmed"
		);
		Ok(record)
	}

	/// Stores a `pending` record for a vote whose transaction is not verified yet.
	#[instrument(skip(self, claim))]
	pub async fn record_pending_vote(
		&self,
		transaction_hash: &str,
		vote_id: &str,
		claim: Option<VoteClaim>,
		now: i64,
	) -> Result<VoteTransactionRecord, ReconciliationError> {
		if !is_valid_transaction_hash(transaction_hash) {
			return Err(ReconciliationError::VerificationFailed(
				VerificationError::InvalidHashFormat,
			));
		}

		let record = self
			.repository
			.create(VoteTransactionRecord::pending(
				transaction_hash,
				vote_id,
				claim,
				now,
			))
			.await?;

		PENDING_RECORDS.inc();
		tracing::info!(
			transaction_hash = %record.transaction_hash,
			%vote_id,
			"vote recorded as pending"
		);
		Ok(record)
	}

	/// Checks recent pending records once each.
	///
	/// Only records created within the pending horizon are considered, newest first and
	/// at most `batch_size` of them. Records that cannot be resolved are left untouched.
	///
	/// # Errors
	/// * `StorageError` - The pending records could not be listed
	#[instrument(skip(self))]
	pub async fn sweep_pending(&self, now: i64) -> Result<SweepReport, ReconciliationError> {
		let cutoff = now - self.settings.pending_horizon.as_secs() as i64;
		let pending = self
			.repository
			.find_pending_since(cutoff, self.settings.batch_size)
			.await?;

		let mut report = SweepReport {
			total_pending: pending.len(),
			..SweepReport::default()
		};

		for record in pending {
			let entry = match self.check_once(&record, now).await {
				CheckOutcome::Resolved(resolution) => {
					let stored = self.persist(&record, resolution).await;
					SweepEntry {
						outcome: match stored.status {
							RecordStatus::Confirmed => SweepOutcome::Confirmed,
							RecordStatus::Failed => SweepOutcome::Failed,
							RecordStatus::Pending => SweepOutcome::StillPending,
						},
						message: stored.failure_reason.clone(),
						transaction_hash: stored.transaction_hash,
						vote_id: stored.vote_id,
					}
				}
				CheckOutcome::StillPending(message) => SweepEntry {
					transaction_hash: record.transaction_hash,
					vote_id: record.vote_id,
					outcome: SweepOutcome::StillPending,
					message: Some(message),
				},
				CheckOutcome::Unavailable(message) => SweepEntry {
					transaction_hash: record.transaction_hash,
					vote_id: record.vote_id,
					outcome: SweepOutcome::Error,
					message: Some(message),
				},
			};
			report.push(entry);
		}

		PENDING_RECORDS.set((report.still_pending + report.errors) as i64);
		tracing::info!(
			total_pending = report.total_pending,
			confirmed = report.confirmed,
			failed = report.failed,
			still_pending = report.still_pending,
			errors = report.errors,
			"pending sweep finished"
		);
		Ok(report)
	}

	/// Returns the record for `transaction_hash`, resolving it first if still pending.
	#[instrument(skip(self))]
	pub async fn check_transaction_status(
		&self,
		transaction_hash: &str,
		now: i64,
	) -> Result<VoteTransactionRecord, ReconciliationError> {
		if !is_valid_transaction_hash(transaction_hash) {
			return Err(ReconciliationError::VerificationFailed(
				VerificationError::InvalidHashFormat,
			));
		}

		let record = self.repository.get(transaction_hash).await?.ok_or_else(|| {
			ReconciliationError::record_not_found(
				"No record for transaction hash",
				None,
				Some(HashMap::from([(
					"transaction_hash".to_string(),
					transaction_hash.to_string(),
				)])),
			)
		})?;
		self.refresh(record, now).await
	}

	/// Same as [`Self::check_transaction_status`], looked up by vote id.
	#[instrument(skip(self))]
	pub async fn check_vote_status(
		&self,
		vote_id: &str,
		now: i64,
	) -> Result<VoteTransactionRecord, ReconciliationError> {
		let record = self.repository.get_by_vote_id(vote_id).await?.ok_or_else(|| {
			ReconciliationError::record_not_found(
				"No record for vote",
				None,
				Some(HashMap::from([("vote_id".to_string(), vote_id.to_string())])),
			)
		})?;
		self.refresh(record, now).await
	}

	async fn refresh(
		&self,
		record: VoteTransactionRecord,
		now: i64,
	) -> Result<VoteTransactionRecord, ReconciliationError> {
		if record.status.is_terminal() {
			return Ok(record);
		}

		match self.check_once(&record, now).await {
			CheckOutcome::Resolved(resolution) => Ok(self.persist(&record, resolution).await),
			CheckOutcome::StillPending(message) | CheckOutcome::Unavailable(message) => {
				tracing::debug!(
					transaction_hash = %record.transaction_hash,
					reason = %message,
					"record stays pending"
				);
				Ok(record)
			}
		}
	}

	/// One lookup, no retries. Chain errors never fail a record.
	async fn check_once(&self, record: &VoteTransactionRecord, now: i64) -> CheckOutcome {
		let reader = self.verifier.reader().as_ref();
		let verification = match fetch_once(reader, &record.transaction_hash).await {
			Ok(Some(verification)) => verification,
			Ok(None) => return CheckOutcome::StillPending("Transaction not yet visible".into()),
			Err(e) => {
				tracing::warn!(
					transaction_hash = %record.transaction_hash,
					error = %e,
					"chain lookup failed during reconciliation"
				);
				return CheckOutcome::Unavailable(e.to_string());
			}
		};

		let meta = &verification.transaction;
		if !verification.verified {
			return CheckOutcome::Resolved(RecordResolution::failed(
				meta,
				VerificationError::TransactionReverted.to_string(),
				now,
			));
		}

		let Some(claim) = &record.claim else {
			return CheckOutcome::Resolved(RecordResolution::confirmed(meta, now));
		};

		match match_vote(&verification, claim, self.contract.as_ref()) {
			Ok(_) => CheckOutcome::Resolved(RecordResolution::confirmed(meta, now)),
			Err(e) if e.is_definitive() => {
				CheckOutcome::Resolved(RecordResolution::failed(meta, e.to_string(), now))
			}
			Err(e) => CheckOutcome::Unavailable(e.to_string()),
		}
	}

	/// Stores the resolution. Storage failures are logged and the computed verdict is
	/// returned anyway, without counting it as a transition since the record is still
	/// pending in the store.
	async fn persist(
		&self,
		record: &VoteTransactionRecord,
		resolution: RecordResolution,
	) -> VoteTransactionRecord {
		let stored = match self
			.repository
			.resolve(&record.transaction_hash, &resolution)
			.await
		{
			Ok(stored) => stored,
			Err(e) => {
				tracing::warn!(
					transaction_hash = %record.transaction_hash,
					error = %e,
					"failed to persist record resolution"
				);
				let mut resolved = record.clone();
				resolved.apply(&resolution);
				return resolved;
			}
		};

		let transitioned =
			stored.status == resolution.status && stored.verified_at == Some(resolution.verified_at);
		if transitioned {
			RECONCILIATION_TRANSITIONS_TOTAL
				.with_label_values(&[stored.status.as_str()])
				.inc();
			if PENDING_RECORDS.get() > 0 {
				PENDING_RECORDS.dec();
			}
			tracing::info!(
				transaction_hash = %stored.transaction_hash,
				vote_id = %stored.vote_id,
				status = %stored.status,
				"pending record resolved"
			);
			if stored.status == RecordStatus::Confirmed {
				if let Some(claim) = &stored.claim {
					self.notifier.notify_poll_changed(&claim.poll_id);
				}
			}
		}
		stored
	}
}

fn confirmed_meta(data: &VerificationData) -> TransactionMeta {
	TransactionMeta {
		transaction_hash: data.transaction_hash.clone(),
		block_number: data.block_number,
		block_hash: data.block_hash.clone(),
		status: TransactionStatus::Success,
		gas_used: data.gas_used,
		confirmations: 1,
	}
}
