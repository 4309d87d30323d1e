//! Ledger transaction types shared by the data-source adapters.

use crate::common::{Amount, LedgerAddress, Timestamp, TxRef};
use serde::{Deserialize, Serialize};

/// Signed balance movement for one participant of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
	pub account: LedgerAddress,
	/// Positive when the account received funds, negative when it sent them.
	pub delta: i128,
}

/// A candidate settlement transaction as reported by a data source.
///
/// Both adapters normalize their wire formats into this shape so the matcher
/// evaluates candidates identically regardless of which source produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
	pub tx_ref: TxRef,
	/// Ledger-side timestamp of the transaction (Unix seconds).
	pub timestamp: Timestamp,
	pub changes: Vec<BalanceChange>,
	/// Whether the ledger executed the transaction successfully.
	pub success: bool,
}

impl LedgerTransaction {
	/// Net amount credited to `account` by this transaction.
	///
	/// Returns `None` when the account does not participate or its net flow
	/// is outgoing, so outgoing treasury transactions are never candidates.
	pub fn credited(&self, account: &str) -> Option<u128> {
		let mut net: i128 = 0;
		let mut participates = false;
		for change in &self.changes {
			if change.account == account {
				participates = true;
				net += change.delta;
			}
		}
		if participates && net > 0 {
			Some(net as u128)
		} else {
			None
		}
	}
}

/// A confirmed match between an intent and a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPayment {
	pub tx_ref: TxRef,
	/// Amount actually received at the treasury, in smallest units.
	pub amount: Amount,
	pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tx(changes: Vec<(&str, i128)>) -> LedgerTransaction {
		LedgerTransaction {
			tx_ref: "tx".into(),
			timestamp: 0,
			changes: changes
				.into_iter()
				.map(|(account, delta)| BalanceChange {
					account: account.into(),
					delta,
				})
				.collect(),
			success: true,
		}
	}

	#[test]
	fn test_credited_sums_deltas_for_account() {
		let tx = tx(vec![("treasury", 500), ("payer", -500), ("treasury", 250)]);
		assert_eq!(tx.credited("treasury"), Some(750));
		assert_eq!(tx.credited("payer"), None);
	}

	#[test]
	fn test_credited_ignores_absent_and_outgoing() {
		let tx = tx(vec![("treasury", -900), ("other", 900)]);
		assert_eq!(tx.credited("treasury"), None);
		assert_eq!(tx.credited("missing"), None);
	}
}
