//! Calldata decoding for the polls contract functions.

use alloy::{
	dyn_abi::{DynSolType, DynSolValue},
	json_abi::Function,
	primitives::Bytes,
};

use crate::{
	models::DecodedCall,
	services::decoder::{abi::POLLS_ABI, helpers::NamedValues},
};

/// Decodes `createPoll` or `submitVote` calldata; `None` for anything else.
pub fn decode_call(input: &Bytes) -> Option<DecodedCall> {
	if input.len() < 4 {
		return None;
	}
	let (selector, params) = input.split_at(4);

	if POLLS_ABI.create_poll.selector().as_slice() == selector {
		let values = decode_params(&POLLS_ABI.create_poll, params)?;
		return Some(DecodedCall::CreatePoll {
			poll_id: values.string("pollId")?,
			creator_fid: values.u64("creatorFid")?,
			duration_days: values.u8("durationDays")?,
			option_count: values.u8("optionCount")?,
		});
	}

	if POLLS_ABI.submit_vote.selector().as_slice() == selector {
		let values = decode_params(&POLLS_ABI.submit_vote, params)?;
		return Some(DecodedCall::SubmitVote {
			poll_id: values.string("pollId")?,
			option_index: values.u8("optionIndex")?,
			voter_fid: values.u64("voterFid")?,
		});
	}

	None
}

fn decode_params(function: &Function, params: &[u8]) -> Option<NamedValues> {
	let types = function
		.inputs
		.iter()
		.map(|param| param.selector_type().parse::<DynSolType>())
		.collect::<Result<Vec<_>, _>>()
		.ok()?;

	match DynSolType::Tuple(types).abi_decode_params(params) {
		Ok(DynSolValue::Tuple(values)) => Some(NamedValues::new(&function.inputs, values)),
		Ok(_) => None,
		Err(e) => {
			tracing::debug!(function = %function.name, error = %e, "calldata failed to decode");
			None
		}
	}
}
