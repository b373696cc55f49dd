//! Polls contract ABI.
//!
//! The ABI is versioned with the deployed contract. A redeploy that changes any of these
//! signatures changes the selectors and needs a matching update here.

use alloy::json_abi::{Event, Function, JsonAbi};
use lazy_static::lazy_static;

use crate::models::EventKind;

/// JSON ABI of the events and functions verification relies on
pub const POLLS_CONTRACT_ABI_JSON: &str = r#"[
	{
		"type": "event",
		"name": "PollCreated",
		"anonymous": false,
		"inputs": [
			{ "name": "pollId", "type": "string", "indexed": false },
			{ "name": "creator", "type": "address", "indexed": true },
			{ "name": "creatorFid", "type": "uint256", "indexed": true },
			{ "name": "expiresAt", "type": "uint256", "indexed": false },
			{ "name": "optionCount", "type": "uint8", "indexed": false }
		]
	},
	{
		"type": "event",
		"name": "VoteCast",
		"anonymous": false,
		"inputs": [
			{ "name": "pollId", "type": "string", "indexed": false },
			{ "name": "voter", "type": "address", "indexed": true },
			{ "name": "voterFid", "type": "uint256", "indexed": true },
			{ "name": "optionIndex", "type": "uint8", "indexed": false }
		]
	},
	{
		"type": "function",
		"name": "createPoll",
		"stateMutability": "nonpayable",
		"inputs": [
			{ "name": "pollId", "type": "string" },
			{ "name": "creatorFid", "type": "uint256" },
			{ "name": "durationDays", "type": "uint8" },
			{ "name": "optionCount", "type": "uint8" }
		],
		"outputs": []
	},
	{
		"type": "function",
		"name": "submitVote",
		"stateMutability": "nonpayable",
		"inputs": [
			{ "name": "pollId", "type": "string" },
			{ "name": "optionIndex", "type": "uint8" },
			{ "name": "voterFid", "type": "uint256" }
		],
		"outputs": []
	}
]"#;

lazy_static! {
	pub static ref POLLS_ABI: PollsContractAbi =
		PollsContractAbi::from_json(POLLS_CONTRACT_ABI_JSON).unwrap();
}

/// Parsed polls ABI with the items verification needs pulled out
#[derive(Debug, Clone)]
pub struct PollsContractAbi {
	pub abi: JsonAbi,
	pub poll_created: Event,
	pub vote_cast: Event,
	pub create_poll: Function,
	pub submit_vote: Function,
}

impl PollsContractAbi {
	/// Parses a JSON ABI that declares both poll events and both poll functions.
	pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
		let abi: JsonAbi = serde_json::from_str(json)?;

		let event = |name: &str| {
			abi.event(name)
				.and_then(|overloads| overloads.first())
				.cloned()
				.ok_or_else(|| anyhow::anyhow!("ABI is missing event {}", name))
		};
		let function = |name: &str| {
			abi.function(name)
				.and_then(|overloads| overloads.first())
				.cloned()
				.ok_or_else(|| anyhow::anyhow!("ABI is missing function {}", name))
		};

		Ok(Self {
			poll_created: event(EventKind::PollCreated.name())?,
			vote_cast: event(EventKind::VoteCast.name())?,
			create_poll: function("createPoll")?,
			submit_vote: function("submitVote")?,
			abi,
		})
	}

	pub fn event(&self, kind: EventKind) -> &Event {
		match kind {
			EventKind::PollCreated => &self.poll_created,
			EventKind::VoteCast => &self.vote_cast,
		}
	}

	/// Known events in declaration order
	pub fn events(&self) -> [(EventKind, &Event); 2] {
		[
			(EventKind::PollCreated, &self.poll_created),
			(EventKind::VoteCast, &self.vote_cast),
		]
	}
}
