use std::{
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
	time::Duration,
};
use tokio::time::Instant;

use onchain_poll_verifier::{
	models::{TransactionStatus, VerificationError},
	services::retry::{verify_with_retry, wait_for_confirmations, ConfirmationPolicy, RetryPolicy},
	utils::tests::builders::evm::{
		receipt::ReceiptBuilder,
		transaction::{TransactionBuilder, TEST_TX_HASH},
	},
};

use crate::integration::mocks::{node_unreachable, MockChainReader};

fn never_visible(attempts: usize) -> MockChainReader {
	let mut reader = MockChainReader::new();
	reader
		.expect_get_transaction()
		.times(attempts)
		.returning(|_| Ok(None));
	reader
		.expect_get_transaction_receipt()
		.times(attempts)
		.returning(|_| Ok(None));
	reader
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_five_attempts_and_fifteen_seconds() {
	let reader = never_visible(5);
	let started = Instant::now();

	let result = verify_with_retry(&reader, TEST_TX_HASH, &RetryPolicy::default()).await;

	assert_eq!(result, Err(VerificationError::NotFoundAfterRetries(5)));
	assert_eq!(started.elapsed(), Duration::from_secs(15));
	assert_eq!(
		result.unwrap_err().to_string(),
		"Transaction not found after 5 attempts"
	);
}

#[tokio::test(start_paused = true)]
async fn test_delay_is_capped_by_max_delay() {
	let reader = never_visible(4);
	let policy = RetryPolicy {
		max_attempts: 4,
		base_delay: Duration::from_secs(1),
		max_delay: Duration::from_secs(2),
	};
	let started = Instant::now();

	let result = verify_with_retry(&reader, TEST_TX_HASH, &policy).await;

	assert_eq!(result, Err(VerificationError::NotFoundAfterRetries(4)));
	assert_eq!(started.elapsed(), Duration::from_secs(1 + 2 + 2));
}

#[tokio::test(start_paused = true)]
async fn test_found_on_third_attempt() {
	let calls = Arc::new(AtomicU64::new(0));
	let mut reader = MockChainReader::new();

	let counter = calls.clone();
	reader.expect_get_transaction().times(3).returning(move |_| {
		let call = counter.fetch_add(1, Ordering::SeqCst);
		Ok((call >= 2).then(|| TransactionBuilder::new().build()))
	});
	reader
		.expect_get_transaction_receipt()
		.times(3)
		.returning(|_| Ok(Some(ReceiptBuilder::new().build())));

	let started = Instant::now();
	let found = verify_with_retry(&reader, TEST_TX_HASH, &RetryPolicy::default())
		.await
		.unwrap();

	assert!(found.verified);
	assert_eq!(found.transaction.block_number, 100);
	assert_eq!(found.transaction.gas_used, 52_000);
	assert_eq!(found.transaction.confirmations, 1);
	assert_eq!(started.elapsed(), Duration::from_secs(1 + 2));
}

#[tokio::test(start_paused = true)]
async fn test_malformed_hash_makes_no_chain_calls() {
	let mut reader = MockChainReader::new();
	reader.expect_get_transaction().never();
	reader.expect_get_transaction_receipt().never();

	for hash in ["", "0x1234", "7c6f0c4d", "0xZZ6f0c4d1b1a2c9e1f2a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f80"] {
		let result = verify_with_retry(&reader, hash, &RetryPolicy::default()).await;
		assert_eq!(result, Err(VerificationError::InvalidHashFormat));
	}
}

#[tokio::test(start_paused = true)]
async fn test_persistent_chain_errors_are_unavailable() {
	let mut reader = MockChainReader::new();
	reader
		.expect_get_transaction()
		.times(5)
		.returning(|_| Err(node_unreachable()));
	reader
		.expect_get_transaction_receipt()
		.returning(|_| Ok(None));

	let result = verify_with_retry(&reader, TEST_TX_HASH, &RetryPolicy::default()).await;

	match result {
		Err(VerificationError::ChainUnavailable(message)) => {
			assert!(message.contains("eth_getTransactionByHash failed"))
		}
		other => panic!("expected ChainUnavailable, got {:?}", other),
	}
}

#[tokio::test(start_paused = true)]
async fn test_transient_error_then_success() {
	let calls = Arc::new(AtomicU64::new(0));
	let mut reader = MockChainReader::new();

	let counter = calls.clone();
	reader.expect_get_transaction().returning(move |_| {
		if counter.fetch_add(1, Ordering::SeqCst) == 0 {
			Err(node_unreachable())
		} else {
			Ok(Some(TransactionBuilder::new().build()))
		}
	});
	reader
		.expect_get_transaction_receipt()
		.returning(|_| Ok(Some(ReceiptBuilder::new().build())));

	let found = verify_with_retry(&reader, TEST_TX_HASH, &RetryPolicy::default()).await;

	assert!(found.is_ok());
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reverted_receipt_is_found_but_not_verified() {
	let mut reader = MockChainReader::new();
	reader
		.expect_get_transaction()
		.times(1)
		.returning(|_| Ok(Some(TransactionBuilder::new().build())));
	reader
		.expect_get_transaction_receipt()
		.times(1)
		.returning(|_| Ok(Some(ReceiptBuilder::new().status(false).build())));

	let found = verify_with_retry(&reader, TEST_TX_HASH, &RetryPolicy::default())
		.await
		.unwrap();

	assert!(!found.verified);
	assert_eq!(found.transaction.status, TransactionStatus::Failure);
}

#[tokio::test(start_paused = true)]
async fn test_confirmations_reached_as_chain_grows() {
	let head = Arc::new(AtomicU64::new(100));
	let mut reader = MockChainReader::new();
	reader
		.expect_get_transaction_receipt()
		.returning(|_| Ok(Some(ReceiptBuilder::new().block_number(100).build())));

	let chain_head = head.clone();
	reader
		.expect_get_latest_block_number()
		.returning(move || Ok(chain_head.fetch_add(1, Ordering::SeqCst)));

	let policy = ConfirmationPolicy {
		poll_interval: Duration::from_millis(250),
		max_wait: Duration::from_secs(10),
	};
	let started = Instant::now();
	let status = wait_for_confirmations(&reader, TEST_TX_HASH, 3, &policy)
		.await
		.unwrap();

	assert!(status.confirmed);
	assert_eq!(status.block_number, 100);
	assert_eq!(status.confirmations, 3);
	assert_eq!(status.status, TransactionStatus::Success);
	assert_eq!(started.elapsed(), Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_timeout() {
	let mut reader = MockChainReader::new();
	reader
		.expect_get_transaction_receipt()
		.returning(|_| Ok(None));
	reader.expect_get_latest_block_number().never();

	let policy = ConfirmationPolicy {
		poll_interval: Duration::from_millis(250),
		max_wait: Duration::from_secs(1),
	};
	let result = wait_for_confirmations(&reader, TEST_TX_HASH, 1, &policy).await;

	assert_eq!(result, Err(VerificationError::ConfirmationTimeout(1_000)));
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_rejects_malformed_hash() {
	let mut reader = MockChainReader::new();
	reader.expect_get_transaction_receipt().never();

	let result =
		wait_for_confirmations(&reader, "0xabc", 1, &ConfirmationPolicy::default()).await;
	assert_eq!(result, Err(VerificationError::InvalidHashFormat));
}
