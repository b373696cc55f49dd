//! Vote transaction record storage.
//!
//! Records are keyed by their lowercase transaction hash. Two backends are provided:
//! - File-based storage with one JSON document per record
//! - In-memory storage for tests and short-lived processes

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use glob::glob;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::Arc,
};
use tokio::sync::{Mutex, RwLock};

use crate::{
	models::{normalize_hash, RecordResolution, RecordStatus, VoteTransactionRecord},
	repositories::error::RepositoryError,
};

/// Interface for vote transaction record stores
///
/// A record leaves `pending` at most once: `resolve` is a no-op on terminal records,
/// so concurrent reconcilers converge on the first stored verdict.
#[async_trait]
pub trait TransactionRecordRepositoryTrait: Clone + Send + Sync {
	/// Get the record stored for a transaction hash
	async fn get(&self, transaction_hash: &str)
		-> Result<Option<VoteTransactionRecord>, RepositoryError>;

	/// Get the record linked to a vote
	async fn get_by_vote_id(
		&self,
		vote_id: &str,
	) -> Result<Option<VoteTransactionRecord>, RepositoryError>;

	/// Store a new record
	///
	/// # Errors
	/// * `RepositoryError::Conflict` - A record with the same hash exists
	async fn create(
		&self,
		record: VoteTransactionRecord,
	) -> Result<VoteTransactionRecord, RepositoryError>;

	/// Move a pending record to the resolution's terminal status
	///
	/// # Returns
	/// * The updated record, or the stored record unchanged when it was already terminal
	///
	/// # Errors
	/// * `RepositoryError::NotFound` - No record for the hash
	async fn resolve(
		&self,
		transaction_hash: &str,
		resolution: &RecordResolution,
	) -> Result<VoteTransactionRecord, RepositoryError>;

	/// Pending records created strictly after `cutoff`, newest first, at most `limit`
	async fn find_pending_since(
		&self,
		cutoff: i64,
		limit: usize,
	) -> Result<Vec<VoteTransactionRecord>, RepositoryError>;
}

fn select_pending(
	records: impl IntoIterator<Item = VoteTransactionRecord>,
	cutoff: i64,
	limit: usize,
) -> Vec<VoteTransactionRecord> {
	let mut pending: Vec<_> = records
		.into_iter()
		.filter(|record| record.status == RecordStatus::Pending && record.created_at > cutoff)
		.collect();
	pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
	pending.truncate(limit);
	pending
}

fn duplicate_error(transaction_hash: &str) -> RepositoryError {
	RepositoryError::conflict(
		"Transaction hash already recorded",
		None,
		Some(HashMap::from([(
			"transaction_hash".to_string(),
			transaction_hash.to_string(),
		)])),
	)
}

fn not_found_error(transaction_hash: &str) -> RepositoryError {
	RepositoryError::not_found(
		"No record for transaction hash",
		None,
		Some(HashMap::from([(
			"transaction_hash".to_string(),
			transaction_hash.to_string(),
		)])),
	)
}

/// File-based record store
///
/// Each record lives in `{storage_path}/{transaction_hash}.json`. Writes go through a
/// shared lock so the check-then-write in `create` and `resolve` is atomic per process.
/// A record is written to a `.json.tmp` sibling and renamed over the target, so readers
/// in other processes see either the old or the new document.
#[derive(Clone)]
pub struct FileTransactionRecordRepository {
	storage_path: PathBuf,
	write_lock: Arc<Mutex<()>>,
}

impl FileTransactionRecordRepository {
	/// Creates the store, creating `storage_path` if it does not exist
	pub async fn new(storage_path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
		let storage_path = storage_path.into();
		tokio::fs::create_dir_all(&storage_path).await.map_err(|e| {
			RepositoryError::load_error(
				"Failed to create record storage directory",
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					storage_path.display().to_string(),
				)])),
			)
		})?;

		Ok(Self {
			storage_path,
			write_lock: Arc::new(Mutex::new(())),
		})
	}

	pub fn storage_path(&self) -> &Path {
		&self.storage_path
	}

	fn record_path(&self, transaction_hash: &str) -> PathBuf {
		self.storage_path
			.join(format!("{}.json", normalize_hash(transaction_hash)))
	}

	async fn read_record(
		&self,
		path: &Path,
	) -> Result<Option<VoteTransactionRecord>, RepositoryError> {
		let content = match tokio::fs::read_to_string(path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => {
				return Err(RepositoryError::load_error(
					"Failed to read record",
					Some(Box::new(e)),
					Some(HashMap::from([(
						"path".to_string(),
						path.display().to_string(),
					)])),
				))
			}
		};

		serde_json::from_str(&content).map(Some).map_err(|e| {
			RepositoryError::load_error(
				"Failed to parse record",
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			)
		})
	}

	async fn write_record(&self, record: &VoteTransactionRecord) -> Result<(), RepositoryError> {
		let path = self.record_path(&record.transaction_hash);
		let json = serde_json::to_string_pretty(record).map_err(|e| {
			RepositoryError::internal_error("Failed to serialize record", Some(Box::new(e)), None)
		})?;
		let staging = path.with_extension("json.tmp");
		let write_error = |e: std::io::Error| {
			RepositoryError::internal_error(
				"Failed to write record",
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			)
		};

		tokio::fs::write(&staging, json).await.map_err(write_error)?;
		tokio::fs::rename(&staging, &path).await.map_err(write_error)
	}

	async fn load_all(&self) -> Result<Vec<VoteTransactionRecord>, RepositoryError> {
		let pattern = self
			.storage_path
			.join("*.json")
			.to_string_lossy()
			.to_string();

		let paths: Vec<PathBuf> = glob(&pattern)
			.map_err(|e| {
				RepositoryError::internal_error(
					"Invalid record storage pattern",
					Some(Box::new(e)),
					Some(HashMap::from([("pattern".to_string(), pattern.clone())])),
				)
			})?
			.flatten()
			.collect();

		let mut records = Vec::new();
		for path in paths {
			match self.read_record(&path).await {
				Ok(Some(record)) => records.push(record),
				Ok(None) => {}
				Err(e) => tracing::warn!(
					path = %path.display(),
					error = %e,
					"skipping unreadable record"
				),
			}
		}
		Ok(records)
	}
}

#[async_trait]
impl TransactionRecordRepositoryTrait for FileTransactionRecordRepository {
	async fn get(
		&self,
		transaction_hash: &str,
	) -> Result<Option<VoteTransactionRecord>, RepositoryError> {
		self.read_record(&self.record_path(transaction_hash)).await
	}

	async fn get_by_vote_id(
		&self,
		vote_id: &str,
	) -> Result<Option<VoteTransactionRecord>, RepositoryError> {
		Ok(self
			.load_all()
			.await?
			.into_iter()
			.find(|record| record.vote_id == vote_id))
	}

	async fn create(
		&self,
		record: VoteTransactionRecord,
	) -> Result<VoteTransactionRecord, RepositoryError> {
		let _guard = self.write_lock.lock().await;
		let path = self.record_path(&record.transaction_hash);
		let exists = tokio::fs::try_exists(&path).await.map_err(|e| {
			RepositoryError::load_error(
				"Failed to check for existing record",
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			)
		})?;
		if exists {
			return Err(duplicate_error(&record.transaction_hash));
		}
		self.write_record(&record).await?;
		Ok(record)
	}

	async fn resolve(
		&self,
		transaction_hash: &str,
		resolution: &RecordResolution,
	) -> Result<VoteTransactionRecord, RepositoryError> {
		let _guard = self.write_lock.lock().await;
		let mut record = self
			.read_record(&self.record_path(transaction_hash))
			.await?
			.ok_or_else(|| not_found_error(transaction_hash))?;

		if record.status.is_terminal() {
			return Ok(record);
		}
		record.apply(resolution);
		self.write_record(&record).await?;
		Ok(record)
	}

	async fn find_pending_since(
		&self,
		cutoff: i64,
		limit: usize,
	) -> Result<Vec<VoteTransactionRecord>, RepositoryError> {
		Ok(select_pending(self.load_all().await?, cutoff, limit))
	}
}

/// In-memory record store
#[derive(Clone, Default)]
pub struct InMemoryTransactionRecordRepository {
	records: Arc<RwLock<HashMap<String, VoteTransactionRecord>>>,
}

impl InMemoryTransactionRecordRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store pre-populated with `records`, keyed by their hashes
	pub fn with_records(records: impl IntoIterator<Item = VoteTransactionRecord>) -> Self {
		let records = records
			.into_iter()
			.map(|record| (normalize_hash(&record.transaction_hash), record))
			.collect();
		Self {
			records: Arc::new(RwLock::new(records)),
		}
	}
}

#[async_trait]
impl TransactionRecordRepositoryTrait for InMemoryTransactionRecordRepository {
	async fn get(
		&self,
		transaction_hash: &str,
	) -> Result<Option<VoteTransactionRecord>, RepositoryError> {
		Ok(self
			.records
			.read()
			.await
			.get(&normalize_hash(transaction_hash))
			.cloned())
	}

	async fn get_by_vote_id(
		&self,
		vote_id: &str,
	) -> Result<Option<VoteTransactionRecord>, RepositoryError> {
		Ok(self
			.records
			.read()
			.await
			.values()
			.find(|record| record.vote_id == vote_id)
			.cloned())
	}

	async fn create(
		&self,
		record: VoteTransactionRecord,
	) -> Result<VoteTransactionRecord, RepositoryError> {
		let mut records = self.records.write().await;
		let key = normalize_hash(&record.transaction_hash);
		if records.contains_key(&key) {
			return Err(duplicate_error(&key));
		}
		records.insert(key, record.clone());
		Ok(record)
	}

	async fn resolve(
		&self,
		transaction_hash: &str,
		resolution: &RecordResolution,
	) -> Result<VoteTransactionRecord, RepositoryError> {
		let mut records = self.records.write().await;
		let record = records
			.get_mut(&normalize_hash(transaction_hash))
			.ok_or_else(|| not_found_error(transaction_hash))?;

		if !record.status.is_terminal() {
			record.apply(resolution);
		}
		Ok(record.clone())
	}

	async fn find_pending_since(
		&self,
		cutoff: i64,
		limit: usize,
	) -> Result<Vec<VoteTransactionRecord>, RepositoryError> {
		let records = self.records.read().await;
		Ok(select_pending(records.values().cloned(), cutoff, limit))
	}
}
