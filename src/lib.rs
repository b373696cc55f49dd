//! Onchain verification of poll and vote transactions.
//!
//! This library checks that a transaction on an EVM chain really emitted the
//! `PollCreated` or `VoteCast` event a client claims, and keeps track of vote
//! transactions that were accepted before they could be verified. It includes:
//!
//! - A JSON-RPC chain reader with endpoint failover
//! - Retry-with-backoff lookups and confirmation waits
//! - ABI decoding of the polls contract events and calls
//! - Claim matchers producing structured verdicts
//! - Reconciliation of pending vote records
//!
//! # Module Structure
//!
//! - `bootstrap`: Wires services from the configuration
//! - `models`: Chain data, verdicts, records and configuration
//! - `repositories`: Vote transaction record storage
//! - `services`: Chain access, decoding, verification and reconciliation
//! - `utils`: Logging, metrics, HTTP and parsing helpers

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
