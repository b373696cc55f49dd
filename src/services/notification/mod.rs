//! Poll refresh notifications.
//!
//! Confirmed votes change a poll's tally, so whatever renders the poll (share images,
//! cached frames) has to be refreshed. Notifiers only enqueue the request; delivery
//! failures are logged and never reach the caller.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Fire-and-forget hook invoked after a vote on `poll_id` is confirmed
pub trait PollRefreshNotifier: Send + Sync {
	fn notify_poll_changed(&self, poll_id: &str);
}

/// Discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPollRefreshNotifier;

impl PollRefreshNotifier for NoopPollRefreshNotifier {
	fn notify_poll_changed(&self, poll_id: &str) {
		tracing::trace!(%poll_id, "poll refresh skipped");
	}
}

/// Pushes poll ids onto an unbounded channel drained by a refresh worker
#[derive(Debug, Clone)]
pub struct ChannelPollRefreshNotifier {
	sender: UnboundedSender<String>,
}

impl ChannelPollRefreshNotifier {
	/// Creates the notifier and the receiving end the worker should poll
	pub fn new() -> (Self, UnboundedReceiver<String>) {
		let (sender, receiver) = unbounded_channel();
		(Self { sender }, receiver)
	}
}

impl PollRefreshNotifier for ChannelPollRefreshNotifier {
	fn notify_poll_changed(&self, poll_id: &str) {
		if let Err(e) = self.sender.send(poll_id.to_string()) {
			tracing::warn!(%poll_id, error = %e, "poll refresh receiver dropped");
		}
	}
}
