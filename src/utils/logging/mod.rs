//! Logging setup driven by environment variables.
//!
//! - `LOG_MODE`: `stdout` (default) or `file`
//! - `LOG_LEVEL`: `trace`, `debug`, `info` (default), `warn` or `error`
//! - `LOG_DATA_DIR`: directory for log files when `LOG_MODE=file` (default `logs/`)
//! - `LOG_MAX_SIZE`: size in bytes after which a new file is started (default 1GB)

pub mod error;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::{env, fs, path::Path};
use tracing::{info, Subscriber};
use tracing_subscriber::{
	filter::EnvFilter,
	fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
	prelude::*,
	registry::LookupSpan,
};

const DEFAULT_LOG_MAX_SIZE: u64 = 1_073_741_824;
const LOG_FILE_NAME: &str = "verifier.log";

lazy_static! {
	static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap();
}

/// Wraps a formatter and removes color codes from its output
struct StripAnsiFormatter<T> {
	inner: T,
}

impl<S, N, T> FormatEvent<S, N> for StripAnsiFormatter<T>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
	T: FormatEvent<S, N>,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &tracing::Event<'_>,
	) -> std::fmt::Result {
		let mut buf = String::new();
		self.inner.format_event(ctx, Writer::new(&mut buf), event)?;
		write!(writer, "{}", strip_ansi_escapes(&buf))
	}
}

fn strip_ansi_escapes(s: &str) -> String {
	ANSI_ESCAPE.replace_all(s, "").to_string()
}

/// Path of the `index`-th log file for `date_str`, derived from the base file path.
pub fn compute_rolled_file_path(base_file_path: &str, date_str: &str, index: u32) -> String {
	let stem = base_file_path
		.strip_suffix(".log")
		.unwrap_or(base_file_path);
	format!("{}-{}.{}.log", stem, date_str, index)
}

/// Moves to the next index while the candidate file is larger than `max_size`.
pub fn space_based_rolling(
	file_path: &str,
	base_file_path: &str,
	date_str: &str,
	max_size: u64,
) -> String {
	let mut candidate = file_path.to_string();
	let mut index = 1;
	while let Ok(meta) = fs::metadata(&candidate) {
		if meta.len() <= max_size {
			break;
		}
		index += 1;
		candidate = compute_rolled_file_path(base_file_path, date_str, index);
	}
	candidate
}

fn parse_level(level: &str) -> tracing::Level {
	match level.to_lowercase().as_str() {
		"trace" => tracing::Level::TRACE,
		"debug" => tracing::Level::DEBUG,
		"warn" => tracing::Level::WARN,
		"error" => tracing::Level::ERROR,
		_ => tracing::Level::INFO,
	}
}

fn parse_log_max_size(raw: Option<String>) -> Result<u64, String> {
	match raw {
		Some(value) => value
			.trim()
			.parse::<u64>()
			.map_err(|_| format!("LOG_MAX_SIZE must be a valid u64, got '{}'", value)),
		None => Ok(DEFAULT_LOG_MAX_SIZE),
	}
}

fn create_log_format(with_ansi: bool) -> fmt::format::Format<fmt::format::Compact> {
	fmt::format()
		.with_level(true)
		.with_target(true)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_ansi(with_ansi)
		.compact()
}

/// Installs the global tracing subscriber.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Error if the log directory cannot be
///   created or `LOG_MAX_SIZE` is malformed
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
	let log_mode = env::var("LOG_MODE")
		.unwrap_or_else(|_| "stdout".to_string())
		.to_lowercase();
	let log_level = parse_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

	let subscriber = tracing_subscriber::registry().with(EnvFilter::new(log_level.to_string()));

	if log_mode == "file" {
		let log_dir = env::var("LOG_DATA_DIR").unwrap_or_else(|_| "logs/".to_string());
		let base_file_path = format!("{}/{}", log_dir.trim_end_matches('/'), LOG_FILE_NAME);
		let date_str = Utc::now().format("%Y-%m-%d").to_string();

		let dated_path = compute_rolled_file_path(&base_file_path, &date_str, 1);
		if let Some(parent) = Path::new(&dated_path).parent() {
			fs::create_dir_all(parent)?;
		}

		let max_size = parse_log_max_size(env::var("LOG_MAX_SIZE").ok())?;
		let final_path = space_based_rolling(&dated_path, &base_file_path, &date_str, max_size);

		let file_appender = tracing_appender::rolling::never(
			Path::new(&final_path).parent().unwrap_or(Path::new(".")),
			Path::new(&final_path).file_name().unwrap_or_default(),
		);

		subscriber
			.with(
				fmt::layer()
					.event_format(StripAnsiFormatter {
						inner: create_log_format(false),
					})
					.with_writer(file_appender)
					.fmt_fields(fmt::format::PrettyFields::new()),
			)
			.try_init()?;
	} else {
		subscriber
			.with(
				fmt::layer()
					.event_format(create_log_format(true))
					.fmt_fields(fmt::format::PrettyFields::new()),
			)
			.try_init()?;
	}

	info!("Logging is successfully configured (mode: {})", log_mode);
	Ok(())
}
