//! Reconciliation error types.

use crate::{
	models::VerificationError,
	repositories::RepositoryError,
	utils::logging::error::{BoxedSource, ErrorContext, TraceableError},
};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Failures of record-keeping operations
#[derive(ThisError, Debug)]
pub enum ReconciliationError {
	/// The submitted transaction does not prove the vote
	#[error("Verification failed: {0}")]
	VerificationFailed(VerificationError),

	/// A record for the transaction hash already exists
	#[error("Duplicate transaction: {0}")]
	DuplicateTransaction(ErrorContext),

	#[error("Record not found: {0}")]
	RecordNotFound(ErrorContext),

	/// The record store could not be read or written
	#[error("Storage error: {0}")]
	StorageError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl ReconciliationError {
	pub fn duplicate_transaction(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::DuplicateTransaction(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn record_not_found(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RecordNotFound(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn storage_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::StorageError(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// HTTP status a route handler would answer with
	pub fn status_code(&self) -> u16 {
		match self {
			Self::VerificationFailed(e) => e.status_code(),
			Self::DuplicateTransaction(_) => 409,
			Self::RecordNotFound(_) => 404,
			Self::StorageError(_) | Self::Other(_) => 500,
		}
	}
}

impl From<RepositoryError> for ReconciliationError {
	fn from(error: RepositoryError) -> Self {
		match error {
			RepositoryError::Conflict(_) => Self::duplicate_transaction(
				"Transaction already recorded",
				Some(Box::new(error)),
				None,
			),
			RepositoryError::NotFound(_) => {
				Self::record_not_found("Record not found", Some(Box::new(error)), None)
			}
			_ => Self::storage_error("Record store failure", Some(Box::new(error)), None),
		}
	}
}

impl TraceableError for ReconciliationError {
	fn trace_id(&self) -> String {
		match self {
			Self::DuplicateTransaction(ctx) | Self::RecordNotFound(ctx) | Self::StorageError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::VerificationFailed(_) | Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
