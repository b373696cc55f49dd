//! Retry-with-backoff engine.
//!
//! - `verify_with_retry`: exponential backoff until a transaction and its receipt are visible
//! - `wait_for_confirmations`: fixed-interval polling until a confirmation depth is reached
//! - `fetch_once`: the single lookup both loops are built on

mod engine;
mod policy;

pub use engine::{fetch_once, verify_with_retry, wait_for_confirmations, with_verification_timeout};
pub use policy::{ConfirmationPolicy, RetryPolicy};
