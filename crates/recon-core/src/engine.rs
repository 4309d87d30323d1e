//! The reconciliation engine: create, check, list, sweep.

use dashmap::DashMap;
use recon_ledger::{MatchOutcome, TransactionMatcher};
use recon_store::{IntentStoreInterface, StoreError};
use recon_types::{
	Amount, CreateIntentReceipt, IntentId, IntentStatus, LedgerAddress, PaymentIntent,
	PendingIntent, ReconError, Result, StatusReport, Timestamp,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Engine parameters, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// The single statically configured receiving account.
	pub treasury_address: LedgerAddress,
	/// How long a created intent stays payable.
	pub intent_ttl: Duration,
	/// How long terminal intents are retained before the sweep removes
	/// them. Bounds memory growth of the volatile store.
	pub retention: Duration,
}

/// Counts from one cleanup sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
	/// Pending intents demoted to expired.
	pub expired: usize,
	/// Terminal intents removed from the store.
	pub removed: usize,
}

/// Coordinates the intent store and the transaction matcher.
///
/// Each intent's read-modify-write is guarded by a per-id async mutex, so a
/// status transition is atomic with respect to concurrent checks of the same
/// intent and with respect to the sweep's removal decision. Different
/// intents never contend.
pub struct ReconEngine {
	store: Arc<dyn IntentStoreInterface>,
	matcher: Arc<TransactionMatcher>,
	config: EngineConfig,
	locks: DashMap<String, Arc<Mutex<()>>>,
}

fn now_ts() -> Timestamp {
	chrono::Utc::now().timestamp() as Timestamp
}

impl ReconEngine {
	pub fn new(
		store: Arc<dyn IntentStoreInterface>,
		matcher: Arc<TransactionMatcher>,
		config: EngineConfig,
	) -> Self {
		Self {
			store,
			matcher,
			config,
			locks: DashMap::new(),
		}
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Registers a new payment intent. Never touches the ledger.
	pub async fn create_intent(
		&self,
		payer_reference: &str,
		expected_amount: Amount,
		metadata: HashMap<String, serde_json::Value>,
	) -> Result<CreateIntentReceipt> {
		if payer_reference.trim().is_empty() {
			return Err(ReconError::Validation(
				"payer_reference must not be empty".to_string(),
			));
		}
		if expected_amount == 0 {
			return Err(ReconError::Validation(
				"expected_amount must be positive".to_string(),
			));
		}

		let intent = PaymentIntent::new(
			payer_reference,
			expected_amount,
			metadata,
			now_ts(),
			self.config.intent_ttl,
		);
		let receipt = CreateIntentReceipt {
			id: intent.id.clone(),
			treasury_address: self.config.treasury_address.clone(),
			expected_amount: intent.expected_amount,
			expires_at: intent.expires_at,
		};

		self.store
			.create(intent)
			.await
			.map_err(|e| ReconError::Storage(e.to_string()))?;

		info!(
			"Created intent {} for payer {} ({} units, expires {})",
			receipt.id, payer_reference, receipt.expected_amount, receipt.expires_at
		);
		Ok(receipt)
	}

	/// Reports the current status of an intent, reconciling it against the
	/// ledger when it is still pending.
	///
	/// The expiration check runs before any ledger query: a check on an
	/// intent past its TTL expires it deterministically, independent of
	/// external-service health. Terminal intents short-circuit, so repeated
	/// checks on a confirmed intent perform no further queries and return
	/// the same matched transaction.
	pub async fn check_status(&self, id: &IntentId) -> Result<StatusReport> {
		let lock = self.intent_lock(id);
		let _guard = lock.lock().await;

		let mut intent = match self.store.get(id).await {
			Ok(intent) => intent,
			Err(StoreError::NotFound) => {
				self.locks.remove(&id.to_string());
				return Err(ReconError::NotFound(id.to_string()));
			}
			Err(e) => return Err(ReconError::Storage(e.to_string())),
		};

		if intent.status.is_terminal() {
			return Ok(StatusReport::from_intent(&intent));
		}

		let now = now_ts();
		if intent.is_expired_at(now) {
			intent.mark_expired();
			self.persist(&intent).await?;
			debug!("Intent {} expired without payment", intent.id);
			return Ok(StatusReport::from_intent(&intent));
		}

		match self.matcher.find_match(&intent).await {
			MatchOutcome::Matched(payment) => {
				intent.mark_confirmed(payment.tx_ref.clone(), now_ts());
				self.persist(&intent).await?;
				info!(
					"Intent {} confirmed by transaction {} ({} units received)",
					intent.id, payment.tx_ref, payment.amount
				);
			}
			MatchOutcome::NoMatch => {
				debug!("No settling transaction yet for intent {}", intent.id);
			}
			MatchOutcome::Inconclusive => {
				// Every source failed; indistinguishable from "not paid
				// yet" for the caller, which polls again.
				warn!("All ledger sources unavailable for intent {}", intent.id);
			}
		}

		Ok(StatusReport::from_intent(&intent))
	}

	/// Lists still-pending intents for one payer. Pure read.
	pub async fn list_pending(&self, payer_reference: &str) -> Result<Vec<PendingIntent>> {
		let intents = self
			.store
			.list_by_payer(payer_reference, Some(IntentStatus::Pending))
			.await
			.map_err(|e| ReconError::Storage(e.to_string()))?;
		Ok(intents.iter().map(PendingIntent::from_intent).collect())
	}

	/// One cleanup pass over the store.
	///
	/// Demotes pending intents past their TTL to expired, then removes
	/// terminal intents older than the retention window. Pending intents
	/// are never removed regardless of age. Safe to run concurrently with
	/// status checks: every record is re-read and handled under its
	/// per-intent lock.
	pub async fn sweep_expired_and_old(&self) -> Result<SweepOutcome> {
		let now = now_ts();
		let retention_secs = self.config.retention.as_secs();
		let snapshot = self
			.store
			.list_all()
			.await
			.map_err(|e| ReconError::Storage(e.to_string()))?;

		let mut outcome = SweepOutcome::default();
		for stale in snapshot {
			let lock = self.intent_lock(&stale.id);
			let _guard = lock.lock().await;

			// Re-read under the lock; a concurrent check may have moved it.
			let mut intent = match self.store.get(&stale.id).await {
				Ok(intent) => intent,
				Err(StoreError::NotFound) => {
					self.locks.remove(&stale.id.to_string());
					continue;
				}
				Err(e) => return Err(ReconError::Storage(e.to_string())),
			};

			if intent.status == IntentStatus::Pending {
				if intent.is_expired_at(now) {
					intent.mark_expired();
					self.persist(&intent).await?;
					outcome.expired += 1;
				}
				continue;
			}

			if now.saturating_sub(intent.created_at) > retention_secs {
				self.store
					.remove(&intent.id)
					.await
					.map_err(|e| ReconError::Storage(e.to_string()))?;
				self.locks.remove(&intent.id.to_string());
				outcome.removed += 1;
			}
		}

		if outcome.expired > 0 || outcome.removed > 0 {
			info!(
				"Sweep expired {} and removed {} intents",
				outcome.expired, outcome.removed
			);
		}
		Ok(outcome)
	}

	fn intent_lock(&self, id: &IntentId) -> Arc<Mutex<()>> {
		self.locks.entry(id.to_string()).or_default().clone()
	}

	async fn persist(&self, intent: &PaymentIntent) -> Result<()> {
		self.store
			.update(intent.clone())
			.await
			.map_err(|e| ReconError::Storage(e.to_string()))
	}
}
