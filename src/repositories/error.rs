//! Error types for the transaction record stores.
//!
//! Callers need to tell a duplicate write apart from a missing record and from a
//! broken backend, so each gets its own variant.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Failure of a record store operation
#[derive(ThisError, Debug)]
pub enum RepositoryError {
	/// A record with the same transaction hash already exists
	#[error("Conflict: {0}")]
	Conflict(ErrorContext),

	/// Stored data could not be read back
	#[error("Load error: {0}")]
	LoadError(ErrorContext),

	#[error("Not found: {0}")]
	NotFound(ErrorContext),

	/// Write or serialization failure
	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl RepositoryError {
	pub fn conflict(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::Conflict(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn load_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::LoadError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn not_found(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::NotFound(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}

	/// The context attached to the error, if it was raised by a store
	pub fn context(&self) -> Option<&ErrorContext> {
		match self {
			Self::Conflict(ctx)
			| Self::LoadError(ctx)
			| Self::NotFound(ctx)
			| Self::InternalError(ctx) => Some(ctx),
			Self::Other(_) => None,
		}
	}
}

impl TraceableError for RepositoryError {
	fn trace_id(&self) -> String {
		self.context()
			.map(|ctx| ctx.trace_id.clone())
			.unwrap_or_else(|| Uuid::new_v4().to_string())
	}
}
