//! Configuration loading and validation.

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use std::path::Path;

mod error;
mod verifier_config;

pub use error::ConfigError;
pub use verifier_config::{
	ConfirmationConfig, ReconciliationConfig, RetryPolicyConfig, VerifierConfig,
	DEFAULT_CONFIG_PATH,
};

/// Common interface for configuration files
#[async_trait]
pub trait ConfigLoader: Sized {
	/// Read, parse and validate a configuration file
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Returns Ok(()) if the configuration can be used
	fn validate(&self) -> Result<(), ConfigError>;

	/// Logs a warning for settings that work but are unsafe
	fn validate_protocol(&self);

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
			.unwrap_or(false)
	}
}
