use onchain_poll_verifier::{
	models::{RecordResolution, RecordStatus, TransactionMeta, TransactionStatus, VoteClaim, VoteTransactionRecord},
	repositories::{
		FileTransactionRecordRepository, InMemoryTransactionRecordRepository, RepositoryError,
		TransactionRecordRepositoryTrait,
	},
};

fn tx_hash(n: u8) -> String {
	format!("0x{:064x}", n)
}

fn meta(hash: &str) -> TransactionMeta {
	TransactionMeta {
		transaction_hash: hash.to_string(),
		block_number: 100,
		block_hash: Some(format!("0x{}", "bb".repeat(32))),
		status: TransactionStatus::Success,
		gas_used: 52_000,
		confirmations: 1,
	}
}

async fn assert_first_resolution_wins<R: TransactionRecordRepositoryTrait + 'static>(
	repository: R,
) {
	let hash = tx_hash(1);
	repository
		.create(VoteTransactionRecord::pending(&hash, "vote-1", None, 10))
		.await
		.unwrap();

	let confirm = RecordResolution::confirmed(&meta(&hash), 20);
	let fail = RecordResolution::failed(&meta(&hash), "Transaction failed or reverted", 21);

	let (first, second) = {
		let (a, b) = (repository.clone(), repository.clone());
		let (hash_a, hash_b) = (hash.clone(), hash.clone());
		tokio::join!(
			tokio::spawn(async move { a.resolve(&hash_a, &confirm).await.unwrap() }),
			tokio::spawn(async move { b.resolve(&hash_b, &fail).await.unwrap() }),
		)
	};
	let (first, second) = (first.unwrap(), second.unwrap());

	assert_eq!(first, second);
	assert!(first.status.is_terminal());
	assert_eq!(repository.get(&hash).await.unwrap(), Some(first));
}

#[tokio::test]
async fn test_concurrent_resolutions_converge_in_memory() {
	assert_first_resolution_wins(InMemoryTransactionRecordRepository::new()).await;
}

#[tokio::test]
async fn test_concurrent_resolutions_converge_on_disk() {
	let dir = tempfile::tempdir().unwrap();
	let repository = FileTransactionRecordRepository::new(dir.path()).await.unwrap();
	assert_first_resolution_wins(repository).await;
}

#[tokio::test]
async fn test_record_file_layout() {
	let dir = tempfile::tempdir().unwrap();
	let repository = FileTransactionRecordRepository::new(dir.path().join("records"))
		.await
		.unwrap();
	let hash = format!("0x{}", "AB".repeat(32));
	let claim = VoteClaim {
		poll_id: "poll_abc123".to_string(),
		voter_fid: 7,
		option_index: 1,
	};

	repository
		.create(VoteTransactionRecord::pending(&hash, "vote-9", Some(claim), 42))
		.await
		.unwrap();

	let path = dir
		.path()
		.join("records")
		.join(format!("0x{}.json", "ab".repeat(32)));
	let stored: serde_json::Value =
		serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

	assert_eq!(stored["status"], "pending");
	assert_eq!(stored["vote_id"], "vote-9");
	assert_eq!(stored["created_at"], 42);
	assert_eq!(stored["claim"]["poll_id"], "poll_abc123");
	assert!(stored.get("failure_reason").is_none());
}

#[tokio::test]
async fn test_corrupt_record_does_not_hide_other_records() {
	let dir = tempfile::tempdir().unwrap();
	let repository = FileTransactionRecordRepository::new(dir.path()).await.unwrap();
	repository
		.create(VoteTransactionRecord::pending(tx_hash(1), "vote-1", None, 100))
		.await
		.unwrap();
	let corrupt = tx_hash(2);
	std::fs::write(dir.path().join(format!("{}.json", corrupt)), "{ not json").unwrap();

	let error = repository.get(&corrupt).await.unwrap_err();
	assert!(matches!(error, RepositoryError::LoadError(_)));
	assert!(error.to_string().contains("Failed to parse record"));

	let pending = repository.find_pending_since(0, 10).await.unwrap();
	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].transaction_hash, tx_hash(1));
	assert_eq!(
		repository.get_by_vote_id("vote-1").await.unwrap().map(|r| r.transaction_hash),
		Some(tx_hash(1))
	);
	assert!(repository.get_by_vote_id("vote-2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_backends_select_the_same_pending_records() {
	let records: Vec<_> = (0..6u8)
		.map(|n| {
			let mut record =
				VoteTransactionRecord::pending(tx_hash(n), format!("vote-{}", n), None, 100 + n as i64);
			if n == 4 {
				record.status = RecordStatus::Failed;
			}
			record
		})
		.collect();

	let dir = tempfile::tempdir().unwrap();
	let on_disk = FileTransactionRecordRepository::new(dir.path()).await.unwrap();
	for record in records.clone() {
		on_disk.create(record).await.unwrap();
	}
	let in_memory = InMemoryTransactionRecordRepository::with_records(records);

	let from_disk = on_disk.find_pending_since(101, 3).await.unwrap();
	let from_memory = in_memory.find_pending_since(101, 3).await.unwrap();

	let vote_ids: Vec<_> = from_disk.iter().map(|r| r.vote_id.as_str()).collect();
	assert_eq!(vote_ids, vec!["vote-5", "vote-3", "vote-2"]);
	assert_eq!(from_disk, from_memory);
}

#[tokio::test]
async fn test_resolving_unknown_record_is_not_found() {
	let repository = InMemoryTransactionRecordRepository::new();
	let hash = tx_hash(7);

	let error = repository
		.resolve(&hash, &RecordResolution::confirmed(&meta(&hash), 1))
		.await
		.unwrap_err();
	assert!(matches!(error, RepositoryError::NotFound(_)));
}
