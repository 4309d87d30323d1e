//! Ledger data sources and the transaction matcher.
//!
//! Two independent adapters answer the same question (the most recent
//! transactions touching an address) against different backends: a
//! third-party indexing service and a ledger node queried directly. The
//! matcher composes them as an ordered primary/fallback list, so adding or
//! reordering sources never touches the engine.

use async_trait::async_trait;
use recon_types::LedgerTransaction;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod indexer;
	pub mod node;
}
pub mod matcher;

pub use implementations::indexer::IndexerAdapter;
pub use implementations::node::NodeAdapter;
pub use matcher::{MatchOutcome, MatcherConfig, TransactionMatcher};

/// Errors that can occur when querying a ledger data source.
///
/// Every variant is recoverable from the matcher's point of view: it falls
/// back to the next source and, with none left, reports the attempt as
/// inconclusive rather than failing the check.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Transport-level failure reaching the data source.
	#[error("Network error: {0}")]
	Network(String),
	/// The data source answered with a non-success HTTP status.
	#[error("Unexpected status: {0}")]
	UnexpectedStatus(u16),
	/// The data source throttled the request.
	#[error("Rate limited")]
	RateLimited,
	/// The response body could not be decoded.
	#[error("Malformed response: {0}")]
	Malformed(String),
}

/// Trait implemented by every ledger data source.
///
/// Both adapters normalize their wire formats into [`LedgerTransaction`], so
/// the matcher evaluates candidates identically regardless of source.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Short source name used in logs.
	fn name(&self) -> &str;

	/// Fetches the most recent transactions referencing `address`, in the
	/// source's delivery order (newest first), bounded by `limit`.
	async fn recent_transactions(
		&self,
		address: &str,
		limit: usize,
	) -> Result<Vec<LedgerTransaction>, LedgerError>;
}
