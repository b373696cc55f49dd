//! Conversions from decoded ABI values to domain field types.

use alloy::{
	dyn_abi::DynSolValue,
	json_abi::Param,
	primitives::{Address, U256},
};
use std::collections::HashMap;

/// Decoded parameters of one event or call, keyed by ABI parameter name
pub struct NamedValues(HashMap<String, DynSolValue>);

impl NamedValues {
	/// Pairs `params` with `values` positionally
	pub fn new<'a>(
		params: impl IntoIterator<Item = &'a Param>,
		values: impl IntoIterator<Item = DynSolValue>,
	) -> Self {
		Self(
			params
				.into_iter()
				.map(|param| param.name.clone())
				.zip(values)
				.collect(),
		)
	}

	pub fn from_pairs(pairs: impl IntoIterator<Item = (String, DynSolValue)>) -> Self {
		Self(pairs.into_iter().collect())
	}

	pub fn string(&self, name: &str) -> Option<String> {
		self.0.get(name)?.as_str().map(str::to_string)
	}

	pub fn address(&self, name: &str) -> Option<Address> {
		self.0.get(name)?.as_address()
	}

	pub fn uint(&self, name: &str) -> Option<U256> {
		self.0.get(name)?.as_uint().map(|(value, _bits)| value)
	}

	/// Unsigned value narrowed to `u64`; `None` when it does not fit
	pub fn u64(&self, name: &str) -> Option<u64> {
		u64::try_from(self.uint(name)?).ok()
	}

	pub fn u8(&self, name: &str) -> Option<u8> {
		u8::try_from(self.uint(name)?).ok()
	}
}

/// Lowercase `0x`-prefixed rendering
pub fn address_to_string(address: &Address) -> String {
	format!("{:#x}", address)
}
