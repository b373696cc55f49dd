use crate::properties::strategies::{poll_created_strategy, vote_cast_strategy, vote_claim_for};

use onchain_poll_verifier::{
	models::{PollCreationClaim, VerificationError},
	services::verification::{
		compare_poll_created, compare_vote, EXPIRY_TOLERANCE_SECS, SECONDS_PER_DAY,
	},
};
use proptest::{prelude::*, test_runner::Config};

fn claim_for(
	event: &onchain_poll_verifier::models::PollCreatedEvent,
	duration_days: u64,
) -> PollCreationClaim {
	PollCreationClaim {
		poll_id: event.poll_id.clone(),
		creator_fid: event.creator_fid,
		duration_days,
		option_count: event.option_count,
	}
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_expiry_within_tolerance_matches(
		mut event in poll_created_strategy(),
		duration_days in 1u64..=30,
		drift in -(EXPIRY_TOLERANCE_SECS as i64)..=(EXPIRY_TOLERANCE_SECS as i64),
	) {
		let block_timestamp = event.expires_at;
		let expected = block_timestamp + duration_days * SECONDS_PER_DAY;
		event.expires_at = expected.checked_add_signed(drift).unwrap();

		let claim = claim_for(&event, duration_days);
		prop_assert_eq!(compare_poll_created(&event, &claim, block_timestamp), Ok(()));
	}

	#[test]
	fn test_expiry_outside_tolerance_is_rejected(
		mut event in poll_created_strategy(),
		duration_days in 1u64..=30,
		excess in 1u64..1_000_000,
		later in any::<bool>(),
	) {
		let block_timestamp = event.expires_at;
		let expected = block_timestamp + duration_days * SECONDS_PER_DAY;
		let offset = EXPIRY_TOLERANCE_SECS + excess;
		event.expires_at = if later { expected + offset } else { expected - offset };

		let claim = claim_for(&event, duration_days);
		let result = compare_poll_created(&event, &claim, block_timestamp);
		let rejected_on_expiry = matches!(
			result,
			Err(VerificationError::FieldMismatch { field: "Expiry", .. })
		);
		prop_assert!(rejected_on_expiry);
	}

	#[test]
	fn test_poll_id_checked_before_other_fields(
		event in poll_created_strategy(),
		other_fid in any::<u64>(),
	) {
		let mut claim = claim_for(&event, 3);
		claim.poll_id.push_str("_other");
		claim.creator_fid = other_fid;

		let result = compare_poll_created(&event, &claim, 0);
		let rejected_on_poll_id = matches!(
			result,
			Err(VerificationError::FieldMismatch { field: "Poll ID", .. })
		);
		prop_assert!(rejected_on_poll_id);
	}

	#[test]
	fn test_vote_matches_only_identical_claim(
		event in vote_cast_strategy(),
		option_index in 0u8..10,
	) {
		let mut claim = vote_claim_for(&event);
		prop_assert_eq!(compare_vote(&event, &claim), Ok(()));

		claim.option_index = option_index;
		let result = compare_vote(&event, &claim);
		prop_assert_eq!(result.is_ok(), option_index == event.option_index);
		if let Err(error) = result {
			prop_assert!(error.is_definitive());
			prop_assert_eq!(
				error.to_string(),
				format!("Option index mismatch: expected {}, got {}", option_index, event.option_index)
			);
		}
	}

	#[test]
	fn test_vote_with_other_voter_is_rejected(
		event in vote_cast_strategy(),
		voter_fid in any::<u64>(),
	) {
		prop_assume!(voter_fid != event.voter_fid);
		let mut claim = vote_claim_for(&event);
		claim.voter_fid = voter_fid;

		let rejected_on_voter = matches!(
			compare_vote(&event, &claim),
			Err(VerificationError::FieldMismatch { field: "Voter FID", .. })
		);
		prop_assert!(rejected_on_voter);
	}
}
