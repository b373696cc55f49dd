//! Receipt log decoding.

use alloy::{
	dyn_abi::EventExt,
	json_abi::Event,
	primitives::{Address, LogData},
};

use crate::{
	models::{DecodedEvent, EVMReceiptLog, EventKind, PollCreatedEvent, VoteCastEvent},
	services::decoder::{abi::POLLS_ABI, helpers::NamedValues},
};

/// Decodes a single log against the polls ABI.
///
/// Topic 0 is compared with each known event selector in turn. Logs without topics,
/// with an unknown selector or with a payload that does not decode are `Unrecognized`.
pub fn decode_log(log: &EVMReceiptLog) -> DecodedEvent {
	let Some(topic0) = log.topics.first() else {
		return DecodedEvent::Unrecognized;
	};

	for (kind, event) in POLLS_ABI.events() {
		if event.selector() != *topic0 {
			continue;
		}

		return match decode_with(kind, event, log) {
			Some(decoded) => decoded,
			None => {
				tracing::warn!(
					event = %kind,
					address = %log.address,
					"log matches event selector but failed to decode"
				);
				DecodedEvent::Unrecognized
			}
		};
	}

	DecodedEvent::Unrecognized
}

fn decode_with(kind: EventKind, event: &Event, log: &EVMReceiptLog) -> Option<DecodedEvent> {
	let log_data = LogData::new(log.topics.clone(), log.data.clone())?;
	let decoded = event.decode_log(&log_data).ok()?;

	// Indexed and body values come back separately, each in declaration order
	let mut indexed = decoded.indexed.into_iter();
	let mut body = decoded.body.into_iter();
	let values = NamedValues::from_pairs(event.inputs.iter().filter_map(|param| {
		let value = if param.indexed {
			indexed.next()
		} else {
			body.next()
		}?;
		Some((param.name.clone(), value))
	}));

	let decoded = match kind {
		EventKind::PollCreated => DecodedEvent::PollCreated(PollCreatedEvent {
			poll_id: values.string("pollId")?,
			creator_address: values.address("creator")?,
			creator_fid: values.u64("creatorFid")?,
			expires_at: values.u64("expiresAt")?,
			option_count: values.u8("optionCount")?,
		}),
		EventKind::VoteCast => DecodedEvent::VoteCast(VoteCastEvent {
			poll_id: values.string("pollId")?,
			voter_address: values.address("voter")?,
			voter_fid: values.u64("voterFid")?,
			option_index: values.u8("optionIndex")?,
		}),
	};
	Some(decoded)
}

/// Decodes every log of `kind`, optionally restricted to logs emitted by `contract`.
pub fn matching_events(
	logs: &[EVMReceiptLog],
	kind: EventKind,
	contract: Option<&Address>,
) -> Vec<DecodedEvent> {
	emitted_by(logs, contract)
		.map(decode_log)
		.filter(|event| event.kind() == Some(kind))
		.collect()
}

/// First decoded event of `kind` in log order.
///
/// # Arguments
/// * `logs` - Receipt logs in emission order
/// * `kind` - Event wanted
/// * `contract` - When set, logs emitted by any other address are skipped
pub fn find_event(
	logs: &[EVMReceiptLog],
	kind: EventKind,
	contract: Option<&Address>,
) -> Option<DecodedEvent> {
	emitted_by(logs, contract)
		.map(decode_log)
		.find(|event| event.kind() == Some(kind))
}

/// Every recognised polls event in log order
pub fn decode_logs(logs: &[EVMReceiptLog], contract: Option<&Address>) -> Vec<DecodedEvent> {
	emitted_by(logs, contract)
		.map(decode_log)
		.filter(DecodedEvent::is_recognized)
		.collect()
}

fn emitted_by<'a>(
	logs: &'a [EVMReceiptLog],
	contract: Option<&'a Address>,
) -> impl Iterator<Item = &'a EVMReceiptLog> {
	logs.iter()
		.filter(move |log| contract.is_none_or(|address| log.address == *address))
}
