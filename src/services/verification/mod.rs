//! Verification matchers.
//!
//! `matcher` holds the pure comparison steps, reused by reconciliation on single-attempt
//! lookups; `service` wraps them with the retry engine and block lookups.

mod matcher;
mod service;

pub use matcher::{
	compare_poll_created, compare_vote, find_claimed_event, match_poll_creation, match_vote,
	EXPIRY_TOLERANCE_SECS, SECONDS_PER_DAY,
};
pub use service::VerificationService;
