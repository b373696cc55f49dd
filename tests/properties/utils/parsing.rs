use crate::properties::strategies::transaction_hash_strategy;

use onchain_poll_verifier::{
	models::normalize_hash,
	utils::{is_valid_address, is_valid_transaction_hash, parse_hex_quantity},
};
use proptest::{prelude::*, test_runner::Config};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_well_formed_hashes_are_accepted(hash in transaction_hash_strategy()) {
		prop_assert!(is_valid_transaction_hash(&hash));
		prop_assert!(is_valid_transaction_hash(&normalize_hash(&hash)));
	}

	#[test]
	fn test_wrong_length_hashes_are_rejected(digits in "[a-f0-9]{0,63}|[a-f0-9]{65,80}") {
		let hash = format!("0x{}", digits);
		prop_assert!(!is_valid_transaction_hash(&hash));
	}

	#[test]
	fn test_hashes_need_prefix(digits in "[a-f0-9]{64}") {
		prop_assert!(!is_valid_transaction_hash(&digits));
		let with_prefix = format!("0x{}", digits);
		prop_assert!(is_valid_transaction_hash(&with_prefix));
	}

	#[test]
	fn test_non_hex_character_is_rejected(
		digits in "[a-f0-9]{64}",
		position in 0usize..64,
		bad in "[g-zG-Z_ ]",
	) {
		let mut hash = format!("0x{}", digits);
		hash.replace_range(2 + position..3 + position, &bad);
		prop_assert!(!is_valid_transaction_hash(&hash));
	}

	#[test]
	fn test_addresses_are_not_hashes(digits in "[a-f0-9]{40}") {
		let address = format!("0x{}", digits);
		prop_assert!(is_valid_address(&address));
		prop_assert!(!is_valid_transaction_hash(&address));
	}

	#[test]
	fn test_normalize_hash_is_idempotent(hash in transaction_hash_strategy()) {
		let once = normalize_hash(&hash);
		prop_assert_eq!(normalize_hash(&once), once.clone());
		prop_assert_eq!(once, hash.to_lowercase());
	}

	#[test]
	fn test_hex_quantities_parse(value in any::<u64>()) {
		prop_assert_eq!(parse_hex_quantity(&format!("0x{:x}", value)), Ok(value));
	}
}
