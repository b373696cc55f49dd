//! Pure comparison of a fetched transaction against a claimed poll event.
//!
//! Checks run in a fixed order and the first failure is the verdict: execution status,
//! destination contract, presence of the event, then the event fields one by one.

use alloy::primitives::Address;

use crate::{
	models::{
		DecodedEvent, EventKind, PollCreatedEvent, PollCreationClaim, TransactionVerification,
		VerificationData, VerificationError, VoteCastEvent, VoteClaim,
	},
	services::decoder::{address_to_string, matching_events},
};

/// Allowed distance between the emitted expiry and the one derived from the block time
pub const EXPIRY_TOLERANCE_SECS: u64 = 300;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Execution status, destination and event presence; returns the first matching event.
///
/// # Arguments
/// * `verification` - Transaction and receipt returned by the retry engine
/// * `kind` - Event the claim refers to
/// * `contract` - Expected polls contract; `None` skips the address checks
pub fn find_claimed_event(
	verification: &TransactionVerification,
	kind: EventKind,
	contract: Option<&Address>,
) -> Result<DecodedEvent, VerificationError> {
	if !verification.verified {
		return Err(VerificationError::TransactionReverted);
	}

	if let (Some(expected), Some(actual)) = (contract, verification.receipt.to.as_ref()) {
		if expected != actual {
			return Err(VerificationError::WrongContract {
				expected: address_to_string(expected),
				actual: address_to_string(actual),
			});
		}
	}

	let mut events = matching_events(&verification.receipt.logs, kind, contract).into_iter();
	let first = events.next().ok_or(VerificationError::EventNotFound(kind))?;

	let extra = events.count();
	if extra > 0 {
		tracing::warn!(
			transaction_hash = %verification.transaction.transaction_hash,
			event = %kind,
			extra,
			"transaction emitted several matching events; using the first"
		);
	}

	Ok(first)
}

/// Compares a decoded `PollCreated` with the claim.
///
/// The expiry must lie within [`EXPIRY_TOLERANCE_SECS`] of
/// `block_timestamp + duration_days * 86400`.
pub fn compare_poll_created(
	event: &PollCreatedEvent,
	claim: &PollCreationClaim,
	block_timestamp: u64,
) -> Result<(), VerificationError> {
	if event.poll_id != claim.poll_id {
		return Err(VerificationError::field_mismatch(
			"Poll ID",
			&claim.poll_id,
			&event.poll_id,
		));
	}

	if event.creator_fid != claim.creator_fid {
		return Err(VerificationError::field_mismatch(
			"Creator FID",
			claim.creator_fid,
			event.creator_fid,
		));
	}

	let expected_expiry =
		block_timestamp.saturating_add(claim.duration_days.saturating_mul(SECONDS_PER_DAY));
	if event.expires_at.abs_diff(expected_expiry) > EXPIRY_TOLERANCE_SECS {
		return Err(VerificationError::field_mismatch(
			"Expiry",
			format!("{} (±{}s)", expected_expiry, EXPIRY_TOLERANCE_SECS),
			event.expires_at,
		));
	}

	if event.option_count != claim.option_count {
		return Err(VerificationError::field_mismatch(
			"Option count",
			claim.option_count,
			event.option_count,
		));
	}

	Ok(())
}

/// Compares a decoded `VoteCast` with the claim. No tolerance applies.
pub fn compare_vote(event: &VoteCastEvent, claim: &VoteClaim) -> Result<(), VerificationError> {
	if event.poll_id != claim.poll_id {
		return Err(VerificationError::field_mismatch(
			"Poll ID",
			&claim.poll_id,
			&event.poll_id,
		));
	}

	if event.voter_fid != claim.voter_fid {
		return Err(VerificationError::field_mismatch(
			"Voter FID",
			claim.voter_fid,
			event.voter_fid,
		));
	}

	if event.option_index != claim.option_index {
		return Err(VerificationError::field_mismatch(
			"Option index",
			claim.option_index,
			event.option_index,
		));
	}

	Ok(())
}

/// Full poll creation match given the timestamp of the receipt's block
pub fn match_poll_creation(
	verification: &TransactionVerification,
	claim: &PollCreationClaim,
	contract: Option<&Address>,
	block_timestamp: u64,
) -> Result<VerificationData, VerificationError> {
	let event = find_claimed_event(verification, EventKind::PollCreated, contract)?;
	if let DecodedEvent::PollCreated(created) = &event {
		compare_poll_created(created, claim, block_timestamp)?;
	}
	Ok(VerificationData::new(event, &verification.transaction))
}

/// Full vote match
pub fn match_vote(
	verification: &TransactionVerification,
	claim: &VoteClaim,
	contract: Option<&Address>,
) -> Result<VerificationData, VerificationError> {
	let event = find_claimed_event(verification, EventKind::VoteCast, contract)?;
	if let DecodedEvent::VoteCast(vote) = &event {
		compare_vote(vote, claim)?;
	}
	Ok(VerificationData::new(event, &verification.transaction))
}
