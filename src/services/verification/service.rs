//! Verification of poll creation and vote transactions against the chain.
//!
//! Every method returns a verdict rather than failing: chain outages, missing
//! transactions and mismatching events all end up inside [`VerificationResult`].

use alloy::primitives::Address;
use std::{sync::Arc, time::Duration};
use tracing::instrument;

use crate::{
	models::{
		ConfirmationStatus, DecodedEvent, EventKind, ParsedTransaction, PollCreationClaim,
		TransactionVerification, VerificationData, VerificationError, VerificationResult,
		VoteClaim,
	},
	services::{
		blockchain::ChainReader,
		decoder::{decode_call, decode_logs},
		retry::{
			verify_with_retry, wait_for_confirmations, with_verification_timeout,
			ConfirmationPolicy, RetryPolicy,
		},
		verification::matcher::{compare_poll_created, find_claimed_event, match_vote},
	},
	utils::metrics::record_verification,
};

/// Verifies transactions through a shared [`ChainReader`]
pub struct VerificationService<C: ChainReader + ?Sized> {
	reader: Arc<C>,
	retry_policy: RetryPolicy,
	confirmation_policy: ConfirmationPolicy,
	verification_timeout: Option<Duration>,
}

impl<C: ChainReader + ?Sized> Clone for VerificationService<C> {
	fn clone(&self) -> Self {
		Self {
			reader: self.reader.clone(),
			retry_policy: self.retry_policy,
			confirmation_policy: self.confirmation_policy,
			verification_timeout: self.verification_timeout,
		}
	}
}

impl<C: ChainReader + ?Sized> VerificationService<C> {
	pub fn new(reader: Arc<C>, retry_policy: RetryPolicy) -> Self {
		Self {
			reader,
			retry_policy,
			confirmation_policy: ConfirmationPolicy::default(),
			verification_timeout: None,
		}
	}

	pub fn with_confirmation_policy(mut self, policy: ConfirmationPolicy) -> Self {
		self.confirmation_policy = policy;
		self
	}

	/// Upper bound for a whole verification, retries included
	pub fn with_verification_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.verification_timeout = timeout;
		self
	}

	pub fn reader(&self) -> &Arc<C> {
		&self.reader
	}

	pub fn retry_policy(&self) -> &RetryPolicy {
		&self.retry_policy
	}

	/// Runs the retry engine under the configured timeout
	pub async fn fetch_transaction(
		&self,
		transaction_hash: &str,
	) -> Result<TransactionVerification, VerificationError> {
		with_verification_timeout(
			self.verification_timeout,
			verify_with_retry(self.reader.as_ref(), transaction_hash, &self.retry_policy),
		)
		.await
	}

	/// Checks that `transaction_hash` created the claimed poll.
	///
	/// # Arguments
	/// * `transaction_hash` - `0x`-prefixed transaction hash
	/// * `claim` - Poll the caller says the transaction created
	/// * `contract` - Expected polls contract; `None` skips address checks
	///
	/// # Returns
	/// * `VerificationResult` - The decoded event and receipt metadata, or the rejection reason
	#[instrument(skip(self, claim, contract), fields(poll_id = %claim.poll_id))]
	pub async fn verify_poll_creation(
		&self,
		transaction_hash: &str,
		claim: &PollCreationClaim,
		contract: Option<&Address>,
	) -> VerificationResult {
		let result = with_verification_timeout(
			self.verification_timeout,
			self.poll_creation_data(transaction_hash, claim, contract),
		)
		.await;
		self.finish("poll_creation", transaction_hash, result)
	}

	async fn poll_creation_data(
		&self,
		transaction_hash: &str,
		claim: &PollCreationClaim,
		contract: Option<&Address>,
	) -> Result<VerificationData, VerificationError> {
		let verification =
			verify_with_retry(self.reader.as_ref(), transaction_hash, &self.retry_policy).await?;
		let event = find_claimed_event(&verification, EventKind::PollCreated, contract)?;
		let block_timestamp = self
			.block_timestamp(verification.transaction.block_number)
			.await?;

		if let DecodedEvent::PollCreated(created) = &event {
			compare_poll_created(created, claim, block_timestamp)?;
		}
		Ok(VerificationData::new(event, &verification.transaction))
	}

	async fn block_timestamp(&self, block_number: u64) -> Result<u64, VerificationError> {
		match self.reader.get_block(block_number).await {
			Ok(Some(block)) => Ok(block.timestamp_u64()),
			Ok(None) => Err(VerificationError::ChainUnavailable(format!(
				"block {} not available",
				block_number
			))),
			Err(e) => Err(VerificationError::ChainUnavailable(e.to_string())),
		}
	}

	/// Checks that `transaction_hash` cast the claimed vote.
	#[instrument(skip(self, claim, contract), fields(poll_id = %claim.poll_id))]
	pub async fn verify_vote_transaction(
		&self,
		transaction_hash: &str,
		claim: &VoteClaim,
		contract: Option<&Address>,
	) -> VerificationResult {
		let result = with_verification_timeout(self.verification_timeout, async {
			let verification =
				verify_with_retry(self.reader.as_ref(), transaction_hash, &self.retry_policy)
					.await?;
			match_vote(&verification, claim, contract)
		})
		.await;
		self.finish("vote", transaction_hash, result)
	}

	/// Returns the receipt metadata, every recognised polls event and the decoded call.
	#[instrument(skip(self, contract))]
	pub async fn verify_transaction_and_parse_events(
		&self,
		transaction_hash: &str,
		contract: Option<&Address>,
	) -> Result<ParsedTransaction, VerificationError> {
		let result = self.fetch_transaction(transaction_hash).await.map(|verification| {
			ParsedTransaction {
				verified: verification.verified,
				events: decode_logs(&verification.receipt.logs, contract),
				call: decode_call(&verification.input),
				transaction: verification.transaction,
			}
		});
		record_verification("parse", result.as_ref().err());
		result
	}

	/// Waits until the transaction is `required_confirmations` blocks deep.
	pub async fn wait_for_confirmations(
		&self,
		transaction_hash: &str,
		required_confirmations: u64,
	) -> Result<ConfirmationStatus, VerificationError> {
		wait_for_confirmations(
			self.reader.as_ref(),
			transaction_hash,
			required_confirmations,
			&self.confirmation_policy,
		)
		.await
	}

	fn finish(
		&self,
		kind: &str,
		transaction_hash: &str,
		result: Result<VerificationData, VerificationError>,
	) -> VerificationResult {
		record_verification(kind, result.as_ref().err());
		match &result {
			Ok(data) => tracing::info!(
				%transaction_hash,
				block_number = data.block_number,
				"{} verified",
				kind
			),
			Err(e) => tracing::warn!(%transaction_hash, reason = %e, "{} rejected", kind),
		}
		VerificationResult::from(result)
	}
}
