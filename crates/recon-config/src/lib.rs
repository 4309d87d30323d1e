//! Configuration loading for the reconciliation service.
//!
//! Reads a TOML file, substitutes `${VAR}` references from the environment,
//! applies a small set of environment overrides, and validates the result.

use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod types;
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "RECON_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<Config, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config)?;
		self.validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<Config, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;

		let substituted_content = substitute_env_vars(&content)?;

		let config: Config = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn apply_env_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!("Overriding log level from environment");
			config.service.log_level = log_level;
		}

		if let Ok(http_port) = env::var(format!("{}HTTP_PORT", self.env_prefix)) {
			config.service.http_port = http_port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		if let Ok(api_key) = env::var(format!("{}INDEXER_API_KEY", self.env_prefix)) {
			debug!("Overriding indexer API key from environment");
			config.ledger.indexer.api_key = Some(api_key);
		}

		Ok(())
	}

	fn validate_config(&self, config: &Config) -> Result<(), ConfigError> {
		if config.treasury.address.trim().is_empty() {
			return Err(ConfigError::ValidationError(
				"treasury.address must be set".to_string(),
			));
		}

		if config.ledger.indexer.base_url.trim().is_empty() {
			return Err(ConfigError::ValidationError(
				"ledger.indexer.base_url must be set".to_string(),
			));
		}

		if config.ledger.node.rpc_url.trim().is_empty() {
			return Err(ConfigError::ValidationError(
				"ledger.node.rpc_url must be set".to_string(),
			));
		}

		if config.intents.ttl_secs == 0 {
			return Err(ConfigError::ValidationError(
				"intents.ttl_secs must be positive".to_string(),
			));
		}

		if config.matcher.candidate_limit == 0 {
			return Err(ConfigError::ValidationError(
				"matcher.candidate_limit must be positive".to_string(),
			));
		}

		Ok(())
	}
}

/// Replaces `${VAR_NAME}` references with the named environment variable.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let mut result = String::with_capacity(content.len());
	let mut rest = content;

	while let Some(start) = rest.find("${") {
		let (head, tail) = rest.split_at(start);
		result.push_str(head);

		let end = match tail.find('}') {
			Some(end) => end,
			None => break,
		};
		let var_name = &tail[2..end];

		let value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
		result.push_str(&value);

		rest = &tail[end + 1..];
	}
	result.push_str(rest);

	Ok(result)
}
