//! Onchain poll verifier entry point.
//!
//! Verifies that poll-creation and vote transactions on an EVM chain carry the claimed
//! `PollCreated` / `VoteCast` events, keeps vote transaction records, and reconciles
//! votes accepted before their transaction was visible.
//!
//! # Flow
//! 1. Applies CLI flags to the environment and sets up logging
//! 2. Loads the verifier configuration and connects to the configured RPC endpoints
//! 3. Runs the requested command and prints its result as JSON
//! 4. `sweep --schedule` keeps running until Ctrl+C

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

use crate::{
	bootstrap::{initialize_services, Result, Services},
	models::{PollCreationClaim, VerifierConfig, VoteClaim, DEFAULT_CONFIG_PATH},
	services::notification::{ChannelPollRefreshNotifier, PollRefreshNotifier},
	utils::{
		logging::setup_logging, metrics::server::create_metrics_server,
		parse_string_to_bytes_size,
	},
};

use clap::{Parser, Subcommand};
use dotenvy::dotenv_override;
use serde::Serialize;
use std::{
	env::{set_var, var},
	path::PathBuf,
	sync::Arc,
};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

#[derive(Parser)]
#[command(
	name = "onchain-poll-verifier",
	about = "Verifies poll creation and vote transactions against the polls contract and reconciles pending vote records.",
	version
)]
struct Cli {
	/// Path to the verifier configuration file
	#[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH, global = true)]
	config: PathBuf,

	/// Write logs to file instead of stdout
	#[arg(long, global = true)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL", global = true)]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH", global = true)]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size, global = true)]
	log_max_size: Option<u64>,

	/// Address to start the metrics server on (default: 127.0.0.1:8081)
	#[arg(long, value_name = "HOST:PORT", global = true)]
	metrics_address: Option<String>,

	/// Enable metrics server while `sweep --schedule` runs
	#[arg(long, global = true)]
	metrics: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Verify that a transaction created the given poll
	VerifyPoll {
		#[arg(long)]
		hash: String,
		#[arg(long)]
		poll_id: String,
		#[arg(long)]
		creator_fid: u64,
		#[arg(long)]
		duration_days: u64,
		#[arg(long)]
		option_count: u8,
	},

	/// Verify that a transaction cast the given vote
	VerifyVote {
		#[arg(long)]
		hash: String,
		#[arg(long)]
		poll_id: String,
		#[arg(long)]
		voter_fid: u64,
		#[arg(long)]
		option_index: u8,
	},

	/// Print receipt metadata, decoded events and calldata of a transaction
	ParseTransaction {
		#[arg(long)]
		hash: String,
	},

	/// Wait until a transaction has enough confirmations
	WaitConfirmations {
		#[arg(long)]
		hash: String,
		/// Defaults to the network's `confirmation_blocks`
		#[arg(long)]
		confirmations: Option<u64>,
	},

	/// Record a vote transaction, verifying it first unless `--deferred`
	SubmitVote {
		#[arg(long)]
		hash: String,
		#[arg(long)]
		vote_id: String,
		#[arg(long)]
		poll_id: Option<String>,
		#[arg(long)]
		voter_fid: Option<u64>,
		#[arg(long)]
		option_index: Option<u8>,
		/// Store the vote as pending and leave verification to reconciliation
		#[arg(long)]
		deferred: bool,
	},

	/// Show the record for a transaction or vote, resolving it if still pending
	Status {
		#[arg(long, conflicts_with = "vote_id", required_unless_present = "vote_id")]
		hash: Option<String>,
		#[arg(long)]
		vote_id: Option<String>,
	},

	/// Check recent pending records once
	Sweep {
		/// Cron expression (with seconds); keeps sweeping until Ctrl+C
		#[arg(long, value_name = "CRON", num_args = 0..=1, default_missing_value = "")]
		schedule: Option<String>,
	},

	/// Validate the configuration file without contacting the chain
	CheckConfig,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		dotenv_override().ok();

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}

		if self.metrics {
			set_var("METRICS_ENABLED", "true");
		}

		if let Some(address) = &self.metrics_address {
			if let Some(port) = address.split(':').nth(1) {
				set_var("METRICS_PORT", port);
			}
		}
	}
}

/// Builds a vote claim when every part of it was given
fn vote_claim(
	poll_id: Option<String>,
	voter_fid: Option<u64>,
	option_index: Option<u8>,
) -> Option<VoteClaim> {
	Some(VoteClaim {
		poll_id: poll_id?,
		voter_fid: voter_fid?,
		option_index: option_index?,
	})
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn now() -> i64 {
	chrono::Utc::now().timestamp()
}

/// Main entry point for the verifier CLI.
///
/// # Errors
/// Returns an error if the configuration is invalid, the chain cannot be reached, or the
/// record store fails. Rejected verifications are printed and exit with status 2.
#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	cli.apply_to_env();

	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	if let Command::CheckConfig = cli.command {
		return validate_configuration(&cli.config).await;
	}

	let (notifier, mut refresh_requests) = ChannelPollRefreshNotifier::new();
	tokio::spawn(async move {
		while let Some(poll_id) = refresh_requests.recv().await {
			info!(%poll_id, "poll refresh requested");
		}
	});
	let notifier: Arc<dyn PollRefreshNotifier> = Arc::new(notifier);

	let services = initialize_services(&cli.config, notifier)
		.await
		.map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;

	let verified = match cli.command {
		Command::VerifyPoll {
			hash,
			poll_id,
			creator_fid,
			duration_days,
			option_count,
		} => {
			let claim = PollCreationClaim {
				poll_id,
				creator_fid,
				duration_days,
				option_count,
			};
			let result = services
				.verifier
				.verify_poll_creation(&hash, &claim, services.contract.as_ref())
				.await;
			print_json(&result)?;
			result.verified
		}
		Command::VerifyVote {
			hash,
			poll_id,
			voter_fid,
			option_index,
		} => {
			let claim = VoteClaim {
				poll_id,
				voter_fid,
				option_index,
			};
			let result = services
				.verifier
				.verify_vote_transaction(&hash, &claim, services.contract.as_ref())
				.await;
			print_json(&result)?;
			result.verified
		}
		Command::ParseTransaction { hash } => {
			match services
				.verifier
				.verify_transaction_and_parse_events(&hash, services.contract.as_ref())
				.await
			{
				Ok(parsed) => {
					print_json(&parsed)?;
					true
				}
				Err(e) => {
					print_json(&serde_json::json!({ "error": e.to_string() }))?;
					false
				}
			}
		}
		Command::WaitConfirmations {
			hash,
			confirmations,
		} => {
			let required =
				confirmations.unwrap_or(services.config.network.confirmation_blocks);
			match services
				.verifier
				.wait_for_confirmations(&hash, required)
				.await
			{
				Ok(status) => {
					print_json(&status)?;
					true
				}
				Err(e) => {
					print_json(&serde_json::json!({ "error": e.to_string() }))?;
					false
				}
			}
		}
		Command::SubmitVote {
			hash,
			vote_id,
			poll_id,
			voter_fid,
			option_index,
			deferred,
		} => {
			let claim = vote_claim(poll_id, voter_fid, option_index);
			let recorded = match (deferred, claim) {
				(true, claim) => {
					services
						.reconciler
						.record_pending_vote(&hash, &vote_id, claim, now())
						.await
				}
				(false, Some(claim)) => {
					services
						.reconciler
						.record_verified_vote(&hash, &vote_id, &claim, now())
						.await
				}
				(false, None) => {
					return Err(anyhow::anyhow!(
						"--poll-id, --voter-fid and --option-index are required unless --deferred is set"
					)
					.into())
				}
			};
			report_record(recorded)?
		}
		Command::Status { hash, vote_id } => {
			let record = match (hash, vote_id) {
				(Some(hash), _) => {
					services
						.reconciler
						.check_transaction_status(&hash, now())
						.await
				}
				(None, Some(vote_id)) => {
					services.reconciler.check_vote_status(&vote_id, now()).await
				}
				(None, None) => return Err(anyhow::anyhow!("--hash or --vote-id is required").into()),
			};
			report_record(record)?
		}
		Command::Sweep { schedule } => match schedule {
			None => {
				let report = services.reconciler.sweep_pending(now()).await?;
				print_json(&report)?;
				true
			}
			Some(schedule) => {
				run_scheduled_sweeps(services, schedule, cli.metrics_address).await?;
				true
			}
		},
		Command::CheckConfig => true,
	};

	if !verified {
		std::process::exit(2);
	}
	Ok(())
}

/// Prints a record, or the error that prevented storing or resolving it
fn report_record(
	result: std::result::Result<
		models::VoteTransactionRecord,
		services::reconciliation::ReconciliationError,
	>,
) -> Result<bool> {
	match result {
		Ok(record) => {
			print_json(&record)?;
			Ok(true)
		}
		Err(e) => {
			print_json(&serde_json::json!({
				"error": e.to_string(),
				"status_code": e.status_code(),
			}))?;
			Ok(false)
		}
	}
}

/// Sweeps on `schedule` (or the configured one) until Ctrl+C.
async fn run_scheduled_sweeps(
	services: Services,
	schedule: String,
	metrics_address: Option<String>,
) -> Result<()> {
	let schedule = Some(schedule)
		.filter(|s| !s.trim().is_empty())
		.or_else(|| services.config.reconciliation.sweep_schedule.clone())
		.ok_or_else(|| {
			anyhow::anyhow!("--schedule needs a cron expression or reconciliation.sweep_schedule")
		})?;

	let reconciler = Arc::new(services.reconciler);
	let scheduler = JobScheduler::new().await?;
	let job = Job::new_async(schedule.as_str(), move |_uuid, _l| {
		let reconciler = reconciler.clone();
		Box::pin(async move {
			match reconciler.sweep_pending(now()).await {
				Ok(report) => match serde_json::to_string(&report) {
					Ok(json) => println!("{}", json),
					Err(e) => error!("Failed to serialize sweep report: {}", e),
				},
				Err(e) => error!("Pending sweep failed: {}", e),
			}
		})
	})?;
	scheduler.add(job).await?;
	scheduler.start().await?;
	info!(%schedule, "Sweep scheduled. Press Ctrl+C to shutdown");

	let metrics_enabled = var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);
	let metrics_address = metrics_address.unwrap_or_else(|| "127.0.0.1:8081".to_string());
	let metrics_server = if metrics_enabled {
		info!("Metrics server enabled, starting on {}", metrics_address);
		match create_metrics_server(metrics_address) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	let ctrl_c = tokio::signal::ctrl_c();
	if let Some(metrics_future) = metrics_server {
		tokio::select! {
			result = ctrl_c => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping sweeps...");
			}
			result = metrics_future => {
				if let Err(e) = result {
					error!("Metrics server error: {}", e);
				}
				info!("Metrics server stopped, stopping sweeps...");
			}
		}
	} else {
		let _ = ctrl_c.await;
		info!("Shutdown signal received, stopping sweeps...");
	}

	let mut scheduler = scheduler;
	scheduler.shutdown().await?;
	info!("Shutdown complete");
	Ok(())
}

/// Validates the configuration file without connecting to the chain
async fn validate_configuration(path: &std::path::Path) -> Result<()> {
	info!("Validating configuration file {}...", path.display());

	let config = match VerifierConfig::load(path).await {
		Ok(config) => config,
		Err(e) => {
			error!("{}", e);
			return Err(e.into());
		}
	};
	info!("✓ Configuration parsed and validated");

	match bootstrap::parse_contract_address(&config)? {
		Some(address) => info!("✓ Polls contract {:#x}", address),
		None => info!("No contract address configured; address checks are disabled"),
	}
	info!(
		"✓ Network '{}' with {} RPC endpoint(s)",
		config.network.slug,
		config.network.rpc_urls.len()
	);

	info!("Configuration validation completed successfully!");
	Ok(())
}
