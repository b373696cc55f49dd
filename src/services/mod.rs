//! Core services implementing the verification logic.
//!
//! - `blockchain`: Chain reader interface, EVM JSON-RPC client and transports
//! - `decoder`: Polls contract ABI and log/calldata decoding
//! - `notification`: Poll refresh notifiers
//! - `reconciliation`: Pending vote record lifecycle
//! - `retry`: Backoff loops around the chain reader
//! - `verification`: Claim matchers and the verification service

pub mod blockchain;
pub mod decoder;
pub mod notification;
pub mod reconciliation;
pub mod retry;
pub mod verification;
