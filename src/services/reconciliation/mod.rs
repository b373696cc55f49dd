//! Reconciliation of vote transaction records.
//!
//! Records move `pending -> confirmed | failed` exactly once. See [`ReconciliationService`].

mod error;
mod service;

pub use error::ReconciliationError;
pub use service::{
	ReconciliationService, ReconciliationSettings, DEFAULT_BATCH_SIZE, DEFAULT_PENDING_HORIZON,
};
