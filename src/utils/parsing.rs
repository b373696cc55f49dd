//! Parsing and shape validation utilities

use byte_unit::Byte;
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

lazy_static! {
	static ref TRANSACTION_HASH: Regex = Regex::new(r"^0x[a-fA-F0-9]{64}$").unwrap();
	static ref ADDRESS: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
}

/// Parses human-readable sizes such as "1GB", "500MB" or "1024KiB" into bytes.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s)
		.map(|byte| byte.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}

/// `0x` followed by exactly 64 hex characters
pub fn is_valid_transaction_hash(hash: &str) -> bool {
	TRANSACTION_HASH.is_match(hash)
}

/// `0x` followed by exactly 40 hex characters
pub fn is_valid_address(address: &str) -> bool {
	ADDRESS.is_match(address)
}

/// Parses a `0x`-prefixed hex quantity as returned by JSON-RPC
pub fn parse_hex_quantity(value: &str) -> Result<u64, std::num::ParseIntError> {
	u64::from_str_radix(value.trim_start_matches("0x"), 16)
}
