//! In-memory intent store backed by a `RwLock`ed map.

use crate::{IntentStoreInterface, StoreError};
use async_trait::async_trait;
use recon_types::{IntentId, IntentStatus, PaymentIntent};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile store keyed by intent id.
///
/// Reads take a shared lock; writes take the exclusive lock for the duration
/// of the single map operation.
#[derive(Default)]
pub struct MemoryStore {
	intents: RwLock<HashMap<String, PaymentIntent>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl IntentStoreInterface for MemoryStore {
	async fn create(&self, intent: PaymentIntent) -> Result<IntentId, StoreError> {
		let id = intent.id.clone();
		self.intents
			.write()
			.await
			.insert(id.to_string(), intent);
		Ok(id)
	}

	async fn get(&self, id: &IntentId) -> Result<PaymentIntent, StoreError> {
		self.intents
			.read()
			.await
			.get(&id.to_string())
			.cloned()
			.ok_or(StoreError::NotFound)
	}

	async fn update(&self, intent: PaymentIntent) -> Result<(), StoreError> {
		let mut intents = self.intents.write().await;
		let key = intent.id.to_string();
		if !intents.contains_key(&key) {
			return Err(StoreError::NotFound);
		}
		intents.insert(key, intent);
		Ok(())
	}

	async fn list_by_payer(
		&self,
		payer_reference: &str,
		status: Option<IntentStatus>,
	) -> Result<Vec<PaymentIntent>, StoreError> {
		let intents = self.intents.read().await;
		Ok(intents
			.values()
			.filter(|i| i.payer_reference == payer_reference)
			.filter(|i| status.map_or(true, |s| i.status == s))
			.cloned()
			.collect())
	}

	async fn list_all(&self) -> Result<Vec<PaymentIntent>, StoreError> {
		Ok(self.intents.read().await.values().cloned().collect())
	}

	async fn remove(&self, id: &IntentId) -> Result<(), StoreError> {
		self.intents
			.write()
			.await
			.remove(&id.to_string())
			.map(|_| ())
			.ok_or(StoreError::NotFound)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::time::Duration;

	fn intent(payer: &str) -> PaymentIntent {
		PaymentIntent::new(payer, 1000, HashMap::new(), 1_700_000_000, Duration::from_secs(1800))
	}

	#[tokio::test]
	async fn test_create_get_round_trip() {
		let store = MemoryStore::new();
		let intent = intent("p1");
		let id = store.create(intent.clone()).await.unwrap();
		assert_eq!(id, intent.id);

		let fetched = store.get(&id).await.unwrap();
		assert_eq!(fetched, intent);
	}

	#[tokio::test]
	async fn test_get_unknown_is_not_found() {
		let store = MemoryStore::new();
		let err = store.get(&IntentId::new()).await.unwrap_err();
		assert!(matches!(err, StoreError::NotFound));
	}

	#[tokio::test]
	async fn test_update_replaces_record() {
		let store = MemoryStore::new();
		let mut intent = intent("p1");
		store.create(intent.clone()).await.unwrap();

		intent.mark_confirmed("tx-9".into(), 1_700_000_100);
		store.update(intent.clone()).await.unwrap();

		let fetched = store.get(&intent.id).await.unwrap();
		assert_eq!(fetched.status, IntentStatus::Confirmed);
		assert_eq!(fetched.matched_tx_ref.as_deref(), Some("tx-9"));
	}

	#[tokio::test]
	async fn test_update_unknown_is_not_found() {
		let store = MemoryStore::new();
		let err = store.update(intent("p1")).await.unwrap_err();
		assert!(matches!(err, StoreError::NotFound));
	}

	#[tokio::test]
	async fn test_list_by_payer_filters_status() {
		let store = MemoryStore::new();
		let pending = intent("p1");
		let mut confirmed = intent("p1");
		confirmed.mark_confirmed("tx".into(), 1);
		let other = intent("p2");

		store.create(pending.clone()).await.unwrap();
		store.create(confirmed).await.unwrap();
		store.create(other).await.unwrap();

		let all = store.list_by_payer("p1", None).await.unwrap();
		assert_eq!(all.len(), 2);

		let pendings = store
			.list_by_payer("p1", Some(IntentStatus::Pending))
			.await
			.unwrap();
		assert_eq!(pendings.len(), 1);
		assert_eq!(pendings[0].id, pending.id);

		assert!(store
			.list_by_payer("p3", None)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn test_remove() {
		let store = MemoryStore::new();
		let intent = intent("p1");
		let id = store.create(intent).await.unwrap();

		store.remove(&id).await.unwrap();
		assert!(matches!(store.get(&id).await, Err(StoreError::NotFound)));
		assert!(matches!(store.remove(&id).await, Err(StoreError::NotFound)));
	}
}
