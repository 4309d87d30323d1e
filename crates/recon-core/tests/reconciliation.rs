//! End-to-end reconciliation flow against an injectable ledger source.

use async_trait::async_trait;
use recon_core::{EngineConfig, ReconEngine};
use recon_ledger::{LedgerError, LedgerInterface, MatcherConfig, TransactionMatcher};
use recon_store::MemoryStore;
use recon_types::{BalanceChange, IntentStatus, LedgerTransaction};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const TREASURY: &str = "treasury-main";

/// Ledger source whose transaction feed the test mutates mid-flight.
#[derive(Clone, Default)]
struct InjectableSource {
	transactions: Arc<RwLock<Vec<LedgerTransaction>>>,
	calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LedgerInterface for InjectableSource {
	fn name(&self) -> &str {
		"injectable"
	}

	async fn recent_transactions(
		&self,
		_address: &str,
		_limit: usize,
	) -> Result<Vec<LedgerTransaction>, LedgerError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.transactions.read().await.clone())
	}
}

fn engine_with(source: InjectableSource) -> ReconEngine {
	let matcher = TransactionMatcher::new(
		vec![Box::new(source)],
		MatcherConfig {
			treasury_address: TREASURY.to_string(),
			amount_tolerance: 1000,
			candidate_limit: 10,
			query_timeout: Duration::from_secs(5),
		},
	);
	ReconEngine::new(
		Arc::new(MemoryStore::new()),
		Arc::new(matcher),
		EngineConfig {
			treasury_address: TREASURY.to_string(),
			intent_ttl: Duration::from_secs(1800),
			retention: Duration::from_secs(86_400),
		},
	)
}

#[tokio::test]
async fn test_create_pay_confirm_round_trip() {
	let source = InjectableSource::default();
	let engine = engine_with(source.clone());

	// 1.5 units, scaled to smallest units.
	let expected: u64 = 1_500_000_000;
	let mut metadata = HashMap::new();
	metadata.insert("order".to_string(), serde_json::json!("ord-7"));

	let receipt = engine
		.create_intent("u1", expected, metadata)
		.await
		.unwrap();
	assert_eq!(receipt.treasury_address, TREASURY);

	// Not paid yet: pending, and listed for the payer.
	let report = engine.check_status(&receipt.id).await.unwrap();
	assert!(!report.confirmed);
	assert_eq!(report.status, IntentStatus::Pending);
	let pending = engine.list_pending("u1").await.unwrap();
	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].id, receipt.id);

	// The payer settles: fabricate a candidate dated after creation, to the
	// treasury, within tolerance (500 units short, fee-adjusted).
	let stored = report.created_at;
	source.transactions.write().await.push(LedgerTransaction {
		tx_ref: "ledger-tx-42".to_string(),
		timestamp: stored + 5,
		changes: vec![
			BalanceChange {
				account: TREASURY.to_string(),
				delta: (expected - 500) as i128,
			},
			BalanceChange {
				account: "payer-wallet".to_string(),
				delta: -((expected - 500) as i128),
			},
		],
		success: true,
	});

	let confirmed = engine.check_status(&receipt.id).await.unwrap();
	assert!(confirmed.confirmed);
	assert_eq!(confirmed.status, IntentStatus::Confirmed);
	assert_eq!(confirmed.matched_tx_ref.as_deref(), Some("ledger-tx-42"));
	let confirmed_at = confirmed.confirmed_at.unwrap();

	// No longer listed as pending.
	assert!(engine.list_pending("u1").await.unwrap().is_empty());

	// Second call is a no-op returning identical fields, with no further
	// ledger queries.
	let queries_after_confirm = source.calls.load(Ordering::SeqCst);
	let again = engine.check_status(&receipt.id).await.unwrap();
	assert_eq!(again.matched_tx_ref.as_deref(), Some("ledger-tx-42"));
	assert_eq!(again.confirmed_at, Some(confirmed_at));
	assert_eq!(source.calls.load(Ordering::SeqCst), queries_after_confirm);
}
