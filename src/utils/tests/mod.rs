//! Test helper utilities
//!
//! Builders producing valid model instances for unit and integration tests.

pub mod builders {
	pub mod evm {
		pub mod block;
		pub mod log;
		pub mod receipt;
		pub mod transaction;
	}

	pub mod config;
	pub mod network;
}

pub use builders::*;
