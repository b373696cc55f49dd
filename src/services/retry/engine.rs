//! Backoff loops around the chain reader.

use backon::{ConstantBuilder, ExponentialBuilder, Retryable};
use std::{
	future::Future,
	sync::atomic::{AtomicU32, Ordering},
	time::Duration,
};
use tracing::instrument;

use crate::{
	models::{ConfirmationStatus, TransactionMeta, TransactionVerification, VerificationError},
	services::{
		blockchain::{BlockChainError, ChainReader},
		retry::{ConfirmationPolicy, RetryPolicy},
	},
	utils::{is_valid_transaction_hash, metrics::CHAIN_ATTEMPTS_TOTAL},
};

/// Why a single attempt did not produce a result
#[derive(Debug)]
enum AttemptError {
	NotFound,
	Unavailable(String),
}

impl std::fmt::Display for AttemptError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::NotFound => f.write_str("not yet visible"),
			Self::Unavailable(msg) => write!(f, "chain error: {}", msg),
		}
	}
}

/// Fetches transaction and receipt concurrently, once.
///
/// # Returns
/// * `Ok(None)` - Either side is not visible on chain yet
/// * `Ok(Some(_))` - Both are visible; `verified` mirrors the receipt status
/// * `Err(_)` - The node could not answer
pub async fn fetch_once<C: ChainReader + ?Sized>(
	reader: &C,
	transaction_hash: &str,
) -> Result<Option<TransactionVerification>, BlockChainError> {
	let (transaction, receipt) = futures::try_join!(
		reader.get_transaction(transaction_hash),
		reader.get_transaction_receipt(transaction_hash)
	)?;

	Ok(match (transaction, receipt) {
		(Some(transaction), Some(receipt)) => Some(TransactionVerification {
			verified: receipt.is_success(),
			transaction: TransactionMeta::from_parts(&transaction, &receipt),
			receipt,
			input: transaction.input,
		}),
		_ => None,
	})
}

/// Polls until the transaction and its receipt are visible, backing off exponentially.
///
/// Chain errors on non-final attempts count as misses. On exhaustion the last miss decides
/// the verdict: `NotFoundAfterRetries` if the node answered, `ChainUnavailable` if it errored.
///
/// # Arguments
/// * `reader` - Chain access
/// * `transaction_hash` - Hash to look up; rejected without any chain call when malformed
/// * `policy` - Attempt count and backoff bounds
#[instrument(skip(reader, policy))]
pub async fn verify_with_retry<C: ChainReader + ?Sized>(
	reader: &C,
	transaction_hash: &str,
	policy: &RetryPolicy,
) -> Result<TransactionVerification, VerificationError> {
	if !is_valid_transaction_hash(transaction_hash) {
		return Err(VerificationError::InvalidHashFormat);
	}

	let attempts = AtomicU32::new(0);
	let operation = || async {
		let attempt = attempts.fetch_add(1, Ordering::SeqCst);
		CHAIN_ATTEMPTS_TOTAL.inc();
		tracing::debug!(attempt, "looking up transaction");

		match fetch_once(reader, transaction_hash).await {
			Ok(Some(found)) => Ok(found),
			Ok(None) => Err(AttemptError::NotFound),
			Err(e) => Err(AttemptError::Unavailable(e.to_string())),
		}
	};

	let backoff = ExponentialBuilder::default()
		.with_min_delay(policy.base_delay)
		.with_max_delay(policy.max_delay)
		.with_factor(2.0)
		.with_max_times(policy.max_attempts.saturating_sub(1) as usize);

	let result = operation
		.retry(backoff)
		.sleep(tokio::time::sleep)
		.notify(|err: &AttemptError, delay: Duration| {
			tracing::debug!(
				reason = %err,
				delay_ms = delay.as_millis() as u64,
				"transaction lookup missed, backing off"
			);
		})
		.await;

	match result {
		Ok(found) => {
			tracing::debug!(
				attempts = attempts.load(Ordering::SeqCst),
				block_number = found.transaction.block_number,
				"transaction found"
			);
			Ok(found)
		}
		Err(AttemptError::NotFound) => {
			Err(VerificationError::NotFoundAfterRetries(policy.max_attempts))
		}
		Err(AttemptError::Unavailable(msg)) => Err(VerificationError::ChainUnavailable(msg)),
	}
}

/// Polls at a fixed interval until the transaction is `required_confirmations` deep.
///
/// Confirmations are `latest - receipt_block + 1`. Lookup errors and unmined receipts are
/// treated as "not yet"; running out of time yields `ConfirmationTimeout`.
#[instrument(skip(reader, policy))]
pub async fn wait_for_confirmations<C: ChainReader + ?Sized>(
	reader: &C,
	transaction_hash: &str,
	required_confirmations: u64,
	policy: &ConfirmationPolicy,
) -> Result<ConfirmationStatus, VerificationError> {
	if !is_valid_transaction_hash(transaction_hash) {
		return Err(VerificationError::InvalidHashFormat);
	}

	let operation = || async {
		let receipt = reader
			.get_transaction_receipt(transaction_hash)
			.await
			.map_err(|e| AttemptError::Unavailable(e.to_string()))?
			.ok_or(AttemptError::NotFound)?;
		let block_number = receipt.block_number_u64().ok_or(AttemptError::NotFound)?;
		let latest = reader
			.get_latest_block_number()
			.await
			.map_err(|e| AttemptError::Unavailable(e.to_string()))?;

		let confirmations = latest.saturating_sub(block_number) + 1;
		if confirmations < required_confirmations {
			tracing::debug!(confirmations, required_confirmations, "waiting for confirmations");
			return Err(AttemptError::NotFound);
		}

		Ok(ConfirmationStatus {
			confirmed: true,
			block_number,
			confirmations,
			status: receipt.status(),
		})
	};

	let backoff = ConstantBuilder::default()
		.with_delay(policy.poll_interval)
		.with_max_times(policy.max_retries());

	operation
		.retry(backoff)
		.sleep(tokio::time::sleep)
		.await
		.map_err(|last| {
			tracing::warn!(reason = %last, "confirmation wait timed out");
			VerificationError::ConfirmationTimeout(policy.max_wait.as_millis() as u64)
		})
}

/// Bounds `verification` by `timeout`; on expiry the future is dropped.
pub async fn with_verification_timeout<T, F>(
	timeout: Option<Duration>,
	verification: F,
) -> Result<T, VerificationError>
where
	F: Future<Output = Result<T, VerificationError>>,
{
	match timeout {
		None => verification.await,
		Some(limit) => tokio::time::timeout(limit, verification)
			.await
			.unwrap_or_else(|_| {
				Err(VerificationError::ChainUnavailable(format!(
					"verification timed out after {}ms",
					limit.as_millis()
				)))
			}),
	}
}
