//! Blockchain data models.
//!
//! Only EVM-compatible chains are supported.

pub mod evm;
