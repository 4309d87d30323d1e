//! Periodic cleanup task, decoupled from request handling.

use crate::engine::ReconEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Handle to the background sweep loop.
///
/// The loop runs on its own tokio task; aborting the handle is the
/// cancellation point. An in-flight sweep stops at its next await and leaves
/// every intent it had not yet locked untouched.
pub struct Sweeper {
	handle: JoinHandle<()>,
}

impl Sweeper {
	/// Spawns the cleanup loop. Reference cadence is hourly.
	pub fn spawn(engine: Arc<ReconEngine>, period: Duration) -> Self {
		info!("Starting cleanup sweep every {:?}", period);
		let handle = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			// interval fires immediately; the first sweep waits one period.
			ticker.tick().await;
			loop {
				ticker.tick().await;
				if let Err(e) = engine.sweep_expired_and_old().await {
					warn!("Cleanup sweep failed: {}", e);
				}
			}
		});
		Self { handle }
	}

	pub fn shutdown(&self) {
		self.handle.abort();
	}
}

impl Drop for Sweeper {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use recon_ledger::{MatcherConfig, TransactionMatcher};
	use recon_store::{IntentStoreInterface, MemoryStore};
	use recon_types::PaymentIntent;
	use std::collections::HashMap;

	#[tokio::test(start_paused = true)]
	async fn test_sweeper_runs_on_period() {
		let store = Arc::new(MemoryStore::new());
		let mut intent =
			PaymentIntent::new("u1", 100, HashMap::new(), 1_000, Duration::from_secs(60));
		intent.mark_expired();
		let id = store.create(intent).await.unwrap();

		let matcher = TransactionMatcher::new(
			vec![],
			MatcherConfig {
				treasury_address: "t".into(),
				amount_tolerance: 1000,
				candidate_limit: 10,
				query_timeout: Duration::from_secs(5),
			},
		);
		let engine = Arc::new(crate::ReconEngine::new(
			store.clone(),
			Arc::new(matcher),
			crate::EngineConfig {
				treasury_address: "t".into(),
				intent_ttl: Duration::from_secs(60),
				retention: Duration::from_secs(3600),
			},
		));

		let sweeper = Sweeper::spawn(engine, Duration::from_secs(10));

		// Ancient terminal intent disappears once the loop has ticked.
		// The second sleep only returns once the sweep task is idle again.
		tokio::time::sleep(Duration::from_secs(11)).await;
		tokio::time::sleep(Duration::from_secs(1)).await;
		assert!(store.get(&id).await.is_err());

		sweeper.shutdown();
	}
}
