//! Intent store for the reconciliation engine.
//!
//! This module provides the storage abstraction behind which payment intents
//! live, supporting different backend implementations such as in-memory or
//! durable stores. The reference backend is volatile: a process restart loses
//! all pending intents, and a production deployment substitutes a durable
//! implementation behind the same trait.

use async_trait::async_trait;
use recon_types::{IntentId, IntentStatus, PaymentIntent};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

pub use implementations::memory::MemoryStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Error that occurs when a requested intent is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for intent storage backends.
///
/// The store only holds records; status transitions are decided by the
/// engine, which serializes mutations per intent. Implementations must
/// support concurrent reads and one consistent mutation per intent at a time.
#[async_trait]
pub trait IntentStoreInterface: Send + Sync {
	/// Inserts a new intent and returns its id.
	async fn create(&self, intent: PaymentIntent) -> Result<IntentId, StoreError>;

	/// Retrieves an intent by id.
	async fn get(&self, id: &IntentId) -> Result<PaymentIntent, StoreError>;

	/// Replaces the stored record for an existing intent.
	async fn update(&self, intent: PaymentIntent) -> Result<(), StoreError>;

	/// Lists intents for one payer, optionally filtered by status.
	async fn list_by_payer(
		&self,
		payer_reference: &str,
		status: Option<IntentStatus>,
	) -> Result<Vec<PaymentIntent>, StoreError>;

	/// Snapshot of every held intent, for the cleanup sweep.
	async fn list_all(&self) -> Result<Vec<PaymentIntent>, StoreError>;

	/// Removes an intent by id.
	async fn remove(&self, id: &IntentId) -> Result<(), StoreError>;
}
