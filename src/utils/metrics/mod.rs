//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines the verification and reconciliation metrics.

pub mod server;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

lazy_static! {
	/// Global Prometheus registry.
	///
	/// This registry holds all metrics defined in this module and is used
	/// to gather metrics for exposure via the metrics endpoint.
	pub static ref REGISTRY: Registry = Registry::new();

	/// Verification verdicts by kind (`poll_creation`, `vote`, `parse`) and outcome
	/// (`verified` or the rejection reason).
	pub static ref VERIFICATIONS_TOTAL: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("verifications_total", "Verification verdicts by kind and outcome"),
			&["kind", "outcome"],
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Chain lookups made by the retry engine, one per attempt.
	pub static ref CHAIN_ATTEMPTS_TOTAL: IntCounter = {
		let counter = IntCounter::new("chain_attempts_total", "Transaction lookup attempts").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Record transitions persisted by reconciliation, by resulting status.
	pub static ref RECONCILIATION_TRANSITIONS_TOTAL: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new(
				"reconciliation_transitions_total",
				"Vote transaction records resolved by reconciliation",
			),
			&["status"],
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Pending records seen by the most recent sweep that are still pending.
	pub static ref PENDING_RECORDS: IntGauge = {
		let gauge = IntGauge::new("pending_records", "Vote transaction records awaiting resolution").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};
}

/// Short label for a verification outcome
pub fn outcome_label(error: Option<&crate::models::VerificationError>) -> &'static str {
	use crate::models::VerificationError::*;

	match error {
		None => "verified",
		Some(InvalidHashFormat) => "invalid_hash",
		Some(ChainUnavailable(_)) => "chain_unavailable",
		Some(NotFoundAfterRetries(_)) => "not_found",
		Some(TransactionReverted) => "reverted",
		Some(WrongContract { .. }) => "wrong_contract",
		Some(EventNotFound(_)) => "event_not_found",
		Some(FieldMismatch { .. }) => "field_mismatch",
		Some(ConfirmationTimeout(_)) => "confirmation_timeout",
	}
}

/// Counts one verdict of `kind`
pub fn record_verification(kind: &str, error: Option<&crate::models::VerificationError>) {
	VERIFICATIONS_TOTAL
		.with_label_values(&[kind, outcome_label(error)])
		.inc();
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}
