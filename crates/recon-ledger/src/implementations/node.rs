//! Direct ledger-node data source speaking JSON-RPC.
//!
//! Fallback source for when the indexing service is unreachable or
//! misbehaving. Nodes report coarser data than the indexer (per-account
//! balance deltas instead of directed transfers) but answer from the ledger
//! itself.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use recon_types::{BalanceChange, LedgerTransaction};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// JSON-RPC client for a ledger node.
pub struct NodeAdapter {
	client: reqwest::Client,
	rpc_url: String,
}

impl NodeAdapter {
	pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| LedgerError::Network(e.to_string()))?;
		Ok(Self {
			client,
			rpc_url: rpc_url.into(),
		})
	}
}

#[derive(Deserialize)]
struct RpcResponse {
	#[serde(default)]
	result: Option<Vec<RpcTransaction>>,
	#[serde(default)]
	error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
	code: i64,
	message: String,
}

#[derive(Deserialize)]
struct RpcTransaction {
	hash: String,
	/// Ledger timestamp of the transaction, Unix seconds.
	utime: u64,
	#[serde(default = "default_success")]
	success: bool,
	#[serde(default)]
	balance_changes: Vec<RpcBalanceChange>,
}

#[derive(Deserialize)]
struct RpcBalanceChange {
	account: String,
	delta: i128,
}

fn default_success() -> bool {
	true
}

#[async_trait]
impl LedgerInterface for NodeAdapter {
	fn name(&self) -> &str {
		"node"
	}

	async fn recent_transactions(
		&self,
		address: &str,
		limit: usize,
	) -> Result<Vec<LedgerTransaction>, LedgerError> {
		let payload = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "get_account_transactions",
			"params": { "account": address, "limit": limit },
		});

		let response = self
			.client
			.post(&self.rpc_url)
			.json(&payload)
			.send()
			.await
			.map_err(|e| LedgerError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(LedgerError::UnexpectedStatus(status.as_u16()));
		}

		let body: RpcResponse = response
			.json()
			.await
			.map_err(|e| LedgerError::Malformed(e.to_string()))?;

		if let Some(error) = body.error {
			return Err(LedgerError::Malformed(format!(
				"RPC error {}: {}",
				error.code, error.message
			)));
		}

		let transactions = body
			.result
			.ok_or_else(|| LedgerError::Malformed("missing result".to_string()))?;

		Ok(transactions
			.into_iter()
			.map(|tx| LedgerTransaction {
				tx_ref: tx.hash,
				timestamp: tx.utime,
				changes: tx
					.balance_changes
					.into_iter()
					.map(|change| BalanceChange {
						account: change.account,
						delta: change.delta,
					})
					.collect(),
				success: tx.success,
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rpc_result_decodes_to_ledger_transactions() {
		let body: RpcResponse = serde_json::from_str(
			r#"{
				"jsonrpc": "2.0",
				"id": 1,
				"result": [{
					"hash": "def",
					"utime": 1700000100,
					"success": true,
					"balance_changes": [
						{"account": "treasury", "delta": 1499500},
						{"account": "payer", "delta": -1500000}
					]
				}]
			}"#,
		)
		.unwrap();

		let txs = body.result.unwrap();
		assert_eq!(txs.len(), 1);
		assert_eq!(txs[0].hash, "def");
		assert_eq!(txs[0].balance_changes[0].delta, 1_499_500);
	}

	#[test]
	fn test_rpc_error_body_decodes() {
		let body: RpcResponse = serde_json::from_str(
			r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "method not found"}}"#,
		)
		.unwrap();
		let error = body.error.unwrap();
		assert_eq!(error.code, -32601);
		assert_eq!(error.message, "method not found");
		assert!(body.result.is_none());
	}
}
