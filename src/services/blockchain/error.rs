//! Chain reader error types.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Failures while reading chain data
#[derive(ThisError, Debug)]
pub enum BlockChainError {
	/// Node could not be reached or every endpoint failed
	#[error("Connection error: {0}")]
	ConnectionError(ErrorContext),

	/// Node answered with a JSON-RPC error or a response we could not interpret
	#[error("Request error: {0}")]
	RequestError(ErrorContext),

	/// Client-side failure unrelated to the node
	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl BlockChainError {
	pub fn connection_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ConnectionError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn request_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RequestError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for BlockChainError {
	fn trace_id(&self) -> String {
		match self {
			Self::ConnectionError(ctx) | Self::RequestError(ctx) | Self::InternalError(ctx) => {
				ctx.trace_id.clone()
			}
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
