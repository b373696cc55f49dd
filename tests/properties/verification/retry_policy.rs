use onchain_poll_verifier::services::retry::RetryPolicy;
use proptest::{prelude::*, test_runner::Config};
use std::time::Duration;

fn policy_strategy() -> impl Strategy<Value = RetryPolicy> {
	(1u32..12, 1u64..5_000, 1u64..60_000).prop_map(|(max_attempts, base_ms, max_ms)| {
		RetryPolicy {
			max_attempts,
			base_delay: Duration::from_millis(base_ms),
			max_delay: Duration::from_millis(base_ms.max(max_ms)),
		}
	})
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_delays_double_until_capped(policy in policy_strategy(), attempt in 0u32..10) {
		let delay = policy.delay_after(attempt);
		let next = policy.delay_after(attempt + 1);

		prop_assert!(delay <= policy.max_delay);
		prop_assert!(next >= delay);
		if next < policy.max_delay {
			prop_assert_eq!(next, delay * 2);
		}
	}

	#[test]
	fn test_total_backoff_counts_sleeps_between_attempts(policy in policy_strategy()) {
		let sleeps = policy.max_attempts - 1;
		let total = policy.total_backoff();

		prop_assert!(total <= policy.max_delay * sleeps);
		prop_assert!(total >= policy.base_delay * sleeps.min(1));
	}
}
