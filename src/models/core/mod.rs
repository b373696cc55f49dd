mod event;
mod network;
mod record;
mod verification;

pub use event::{DecodedCall, DecodedEvent, EventKind, PollCreatedEvent, VoteCastEvent};
pub use network::{Network, RpcUrl};
pub use record::{
	normalize_hash, RecordResolution, RecordStatus, SweepEntry, SweepOutcome, SweepReport,
	VoteTransactionRecord,
};
pub use verification::{
	ConfirmationStatus, ParsedTransaction, PollCreationClaim, TransactionMeta,
	TransactionVerification, VerificationData, VerificationError, VerificationResult, VoteClaim,
};
