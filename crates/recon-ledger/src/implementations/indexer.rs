//! Block-explorer indexing service data source.
//!
//! The indexer pre-indexes ledger transactions and exposes them over a REST
//! API. It is the preferred (primary) source: cheaper than a node query and
//! richer in transfer detail.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use recon_types::{BalanceChange, LedgerTransaction};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Client for the indexing service's accounts API.
pub struct IndexerAdapter {
	client: reqwest::Client,
	base_url: String,
	api_key: Option<String>,
}

impl IndexerAdapter {
	pub fn new(
		base_url: impl Into<String>,
		api_key: Option<String>,
		timeout: Duration,
	) -> Result<Self, LedgerError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| LedgerError::Network(e.to_string()))?;
		Ok(Self {
			client,
			base_url: base_url.into(),
			api_key,
		})
	}
}

#[derive(Deserialize)]
struct TransactionPage {
	#[serde(default)]
	transactions: Vec<IndexedTransaction>,
}

#[derive(Deserialize)]
struct IndexedTransaction {
	hash: String,
	timestamp: u64,
	#[serde(default = "default_success")]
	success: bool,
	#[serde(default)]
	transfers: Vec<IndexedTransfer>,
}

#[derive(Deserialize)]
struct IndexedTransfer {
	source: String,
	destination: String,
	amount: u64,
}

fn default_success() -> bool {
	true
}

impl IndexedTransaction {
	/// The indexer reports directed transfers; flatten them into the signed
	/// per-account deltas the matcher works with.
	fn into_ledger_transaction(self) -> LedgerTransaction {
		let mut changes = Vec::with_capacity(self.transfers.len() * 2);
		for transfer in self.transfers {
			changes.push(BalanceChange {
				account: transfer.destination,
				delta: transfer.amount as i128,
			});
			changes.push(BalanceChange {
				account: transfer.source,
				delta: -(transfer.amount as i128),
			});
		}
		LedgerTransaction {
			tx_ref: self.hash,
			timestamp: self.timestamp,
			changes,
			success: self.success,
		}
	}
}

#[async_trait]
impl LedgerInterface for IndexerAdapter {
	fn name(&self) -> &str {
		"indexer"
	}

	async fn recent_transactions(
		&self,
		address: &str,
		limit: usize,
	) -> Result<Vec<LedgerTransaction>, LedgerError> {
		let url = format!(
			"{}/v2/accounts/{}/transactions",
			self.base_url.trim_end_matches('/'),
			address
		);

		let mut request = self.client.get(&url).query(&[("limit", limit.to_string())]);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| LedgerError::Network(e.to_string()))?;

		let status = response.status();
		if status == StatusCode::TOO_MANY_REQUESTS {
			return Err(LedgerError::RateLimited);
		}
		if !status.is_success() {
			return Err(LedgerError::UnexpectedStatus(status.as_u16()));
		}

		let page: TransactionPage = response
			.json()
			.await
			.map_err(|e| LedgerError::Malformed(e.to_string()))?;

		Ok(page
			.transactions
			.into_iter()
			.map(IndexedTransaction::into_ledger_transaction)
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_transfers_flatten_into_signed_deltas() {
		let page: TransactionPage = serde_json::from_str(
			r#"{
				"transactions": [{
					"hash": "abc",
					"timestamp": 1700000000,
					"transfers": [
						{"source": "payer", "destination": "treasury", "amount": 1500000}
					]
				}]
			}"#,
		)
		.unwrap();

		let tx = page
			.transactions
			.into_iter()
			.next()
			.unwrap()
			.into_ledger_transaction();

		assert_eq!(tx.tx_ref, "abc");
		assert!(tx.success);
		assert_eq!(tx.credited("treasury"), Some(1_500_000));
		assert_eq!(tx.credited("payer"), None);
	}

	#[test]
	fn test_missing_optional_fields_default() {
		let page: TransactionPage =
			serde_json::from_str(r#"{"transactions": [{"hash": "x", "timestamp": 1}]}"#).unwrap();
		let tx = &page.transactions[0];
		assert!(tx.success);
		assert!(tx.transfers.is_empty());
	}
}
