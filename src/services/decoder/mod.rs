//! Decoding of polls contract logs and calldata.
//!
//! Decoding is pure: nothing here touches the network, and inputs that do not belong to
//! the polls ABI come back as `Unrecognized` / `None` rather than as errors.

mod abi;
mod calls;
mod events;
mod helpers;

pub use abi::{PollsContractAbi, POLLS_ABI, POLLS_CONTRACT_ABI_JSON};
pub use calls::decode_call;
pub use events::{decode_log, decode_logs, find_event, matching_events};
pub use helpers::address_to_string;
