//! Error types for the reconciliation engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconError>;

/// Engine-level error taxonomy.
///
/// `Validation` and `NotFound` are reported to the caller as-is.
/// `ExternalService` is recovered internally (fallback between data sources,
/// or an inconclusive check the caller retries by polling) and must never
/// reach the caller as a confirmation failure.
#[derive(Error, Debug)]
pub enum ReconError {
	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Intent not found: {0}")]
	NotFound(String),

	#[error("Storage error: {0}")]
	Storage(String),

	#[error("External service error: {0}")]
	ExternalService(String),

	#[error("Configuration error: {0}")]
	Config(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_display() {
		let err = ReconError::Validation("expected_amount must be positive".into());
		assert_eq!(
			err.to_string(),
			"Validation error: expected_amount must be positive"
		);

		let err = ReconError::NotFound("abc".into());
		assert_eq!(err.to_string(), "Intent not found: abc");
	}
}
