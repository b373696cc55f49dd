use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Events emitted by the polls contract that verification understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
	PollCreated,
	VoteCast,
}

impl EventKind {
	/// Event name as declared in the contract ABI
	pub fn name(&self) -> &'static str {
		match self {
			Self::PollCreated => "PollCreated",
			Self::VoteCast => "VoteCast",
		}
	}
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Fields of a decoded `PollCreated` log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCreatedEvent {
	pub poll_id: String,
	pub creator_address: Address,
	pub creator_fid: u64,
	/// Unix seconds
	pub expires_at: u64,
	pub option_count: u8,
}

/// Fields of a decoded `VoteCast` log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCastEvent {
	pub poll_id: String,
	pub voter_address: Address,
	pub voter_fid: u64,
	pub option_index: u8,
}

/// Result of decoding a single receipt log against the polls ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DecodedEvent {
	PollCreated(PollCreatedEvent),
	VoteCast(VoteCastEvent),
	/// The log does not belong to the polls ABI or failed to decode
	Unrecognized,
}

impl DecodedEvent {
	pub fn kind(&self) -> Option<EventKind> {
		match self {
			Self::PollCreated(_) => Some(EventKind::PollCreated),
			Self::VoteCast(_) => Some(EventKind::VoteCast),
			Self::Unrecognized => None,
		}
	}

	pub fn is_recognized(&self) -> bool {
		self.kind().is_some()
	}

	/// Poll the event refers to, if recognised
	pub fn poll_id(&self) -> Option<&str> {
		match self {
			Self::PollCreated(event) => Some(&event.poll_id),
			Self::VoteCast(event) => Some(&event.poll_id),
			Self::Unrecognized => None,
		}
	}
}

/// Decoded calldata of a polls contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum DecodedCall {
	CreatePoll {
		poll_id: String,
		creator_fid: u64,
		duration_days: u8,
		option_count: u8,
	},
	SubmitVote {
		poll_id: String,
		option_index: u8,
		voter_fid: u64,
	},
}
