//! Structured error context shared by the infrastructure error types.
//!
//! Every infrastructure error (transport, client, repository, reconciliation, config)
//! wraps an [`ErrorContext`] carrying a message, an optional source, free-form metadata,
//! a timestamp and a trace id. Trace ids are inherited from the source chain when one
//! is available so a single failure can be followed across layers in the logs.

use chrono::Utc;
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// Boxed error accepted as the source of an [`ErrorContext`]
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message, source and metadata attached to an infrastructure error.
#[derive(Debug)]
pub struct ErrorContext {
	/// Human readable description
	pub message: String,
	/// Underlying cause, if any
	pub source: Option<BoxedSource>,
	/// Extra key/value pairs rendered after the message
	pub metadata: Option<HashMap<String, String>>,
	/// RFC 3339 creation time
	pub timestamp: String,
	/// Trace id, inherited from the source chain or freshly generated
	pub trace_id: String,
}

impl ErrorContext {
	/// Builds a context without logging it.
	///
	/// # Arguments
	/// * `message` - Description of the failure
	/// * `source` - Optional underlying error
	/// * `metadata` - Optional key/value pairs
	pub fn new(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let trace_id = match source.as_ref() {
			Some(src) => TraceableError::trace_id(src.as_ref()),
			None => Uuid::new_v4().to_string(),
		};

		Self {
			message: message.into(),
			source,
			metadata,
			timestamp: Utc::now().to_rfc3339(),
			trace_id,
		}
	}

	/// Builds a context and emits it through `tracing::error!`.
	pub fn new_with_log(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let context = Self::new(message, source, metadata);
		log_error(&context);
		context
	}

	/// Adds one metadata entry, creating the map if needed.
	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.metadata
			.get_or_insert_with(HashMap::new)
			.insert(key.into(), value.into());
		self
	}

	/// Renders `message [k1=v1, k2=v2]` with keys in alphabetical order.
	pub fn format_with_metadata(&self) -> String {
		let Some(metadata) = self.metadata.as_ref().filter(|m| !m.is_empty()) else {
			return self.message.clone();
		};

		let mut entries: Vec<_> = metadata.iter().collect();
		entries.sort_by(|a, b| a.0.cmp(b.0));
		let rendered = entries
			.iter()
			.map(|(k, v)| format!("{}={}", k, v))
			.collect::<Vec<_>>()
			.join(", ");

		format!("{} [{}]", self.message, rendered)
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.format_with_metadata())
	}
}

impl std::error::Error for ErrorContext {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source
			.as_ref()
			.map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
	}
}

/// Errors able to report the trace id of their context
pub trait TraceableError: std::error::Error + Send + Sync {
	fn trace_id(&self) -> String;
}

impl TraceableError for dyn std::error::Error + Send + Sync + 'static {
	fn trace_id(&self) -> String {
		if let Some(id) = try_extract_trace_id(self) {
			return id;
		}

		// Walk at most three levels of the source chain
		let mut source = self.source();
		for _ in 0..3 {
			let Some(err) = source else { break };
			if let Some(id) = try_extract_trace_id(err) {
				return id;
			}
			source = err.source();
		}

		Uuid::new_v4().to_string()
	}
}

fn try_extract_trace_id(err: &(dyn std::error::Error + 'static)) -> Option<String> {
	if let Some(ctx) = err.downcast_ref::<ErrorContext>() {
		return Some(ctx.trace_id.clone());
	}

	macro_rules! try_downcast {
		($($ty:path),*) => {
			$(
				if let Some(e) = err.downcast_ref::<$ty>() {
					return Some(e.trace_id());
				}
			)*
		}
	}

	try_downcast!(
		crate::services::blockchain::TransportError,
		crate::services::blockchain::BlockChainError,
		crate::services::reconciliation::ReconciliationError,
		crate::repositories::RepositoryError,
		crate::models::ConfigError
	);

	None
}

/// Drops HTML bodies some RPC gateways return with error statuses
fn sanitize_error_message(message: &str) -> String {
	if message.contains("<html>") || message.contains("<body>") {
		if let Some(pos) = message.find('<') {
			return message[..pos].trim().to_string();
		}
	}
	message.to_string()
}

fn format_error_chain(err: &dyn std::error::Error) -> String {
	let mut rendered = sanitize_error_message(&err.to_string());
	let mut source = err.source();

	while let Some(cause) = source {
		rendered.push_str("\n\tCaused by: ");
		rendered.push_str(&sanitize_error_message(&cause.to_string()));
		source = cause.source();
	}

	rendered
}

fn log_error(error: &ErrorContext) {
	match &error.source {
		Some(err) => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			error.chain = %format_error_chain(&**err),
			"Error occurred"
		),
		None => tracing::error!(
			message = error.format_with_metadata(),
			trace_id = %error.trace_id,
			timestamp = %error.timestamp,
			"Error occurred"
		),
	}
}
