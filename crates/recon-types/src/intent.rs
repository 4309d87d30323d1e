//! Payment intent data model and its status state machine.
//!
//! An intent records an expected incoming payment before the ledger shows it.
//! Status only moves forward: `Pending -> Confirmed` or `Pending -> Expired`,
//! and both terminal states are sticky.

use crate::common::{Amount, Id, Timestamp, TxRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub type IntentId = Id<PaymentIntent>;

/// Status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
	Pending,
	Confirmed,
	Expired,
}

impl IntentStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(self, IntentStatus::Confirmed | IntentStatus::Expired)
	}
}

impl fmt::Display for IntentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			IntentStatus::Pending => "pending",
			IntentStatus::Confirmed => "confirmed",
			IntentStatus::Expired => "expired",
		};
		write!(f, "{}", s)
	}
}

/// A payment expected at the treasury address, prior to ledger confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
	/// Unique identifier, returned to and later supplied by the caller.
	pub id: IntentId,
	/// Opaque identifier of who requested the payment. Never checked
	/// against the ledger.
	pub payer_reference: String,
	/// Expected amount in the ledger's smallest indivisible unit.
	pub expected_amount: Amount,
	pub status: IntentStatus,
	pub created_at: Timestamp,
	/// `created_at` plus the configured TTL.
	pub expires_at: Timestamp,
	/// Set only on transition to `Confirmed`.
	pub confirmed_at: Option<Timestamp>,
	/// Ledger transaction that satisfied this intent. Set only on
	/// transition to `Confirmed`.
	pub matched_tx_ref: Option<TxRef>,
	/// Opaque caller data, round-tripped verbatim.
	#[serde(default)]
	pub metadata: HashMap<String, serde_json::Value>,
}

impl PaymentIntent {
	pub fn new(
		payer_reference: impl Into<String>,
		expected_amount: Amount,
		metadata: HashMap<String, serde_json::Value>,
		now: Timestamp,
		ttl: Duration,
	) -> Self {
		Self {
			id: IntentId::new(),
			payer_reference: payer_reference.into(),
			expected_amount,
			status: IntentStatus::Pending,
			created_at: now,
			expires_at: now + ttl.as_secs(),
			confirmed_at: None,
			matched_tx_ref: None,
			metadata,
		}
	}

	pub fn is_expired_at(&self, now: Timestamp) -> bool {
		now > self.expires_at
	}

	/// Transitions `Pending -> Confirmed`. Returns false without touching
	/// the record when the intent is already terminal.
	pub fn mark_confirmed(&mut self, tx_ref: TxRef, now: Timestamp) -> bool {
		if self.status != IntentStatus::Pending {
			return false;
		}
		self.status = IntentStatus::Confirmed;
		self.confirmed_at = Some(now);
		self.matched_tx_ref = Some(tx_ref);
		true
	}

	/// Transitions `Pending -> Expired`. Returns false without touching
	/// the record when the intent is already terminal.
	pub fn mark_expired(&mut self) -> bool {
		if self.status != IntentStatus::Pending {
			return false;
		}
		self.status = IntentStatus::Expired;
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn intent(now: Timestamp) -> PaymentIntent {
		PaymentIntent::new("payer-1", 1_500_000, HashMap::new(), now, Duration::from_secs(1800))
	}

	#[test]
	fn test_new_intent_is_pending_with_exact_ttl() {
		let i = intent(1_700_000_000);
		assert_eq!(i.status, IntentStatus::Pending);
		assert_eq!(i.expires_at - i.created_at, 1800);
		assert!(i.confirmed_at.is_none());
		assert!(i.matched_tx_ref.is_none());
	}

	#[test]
	fn test_confirm_sets_both_fields() {
		let mut i = intent(1_700_000_000);
		assert!(i.mark_confirmed("tx-1".into(), 1_700_000_100));
		assert_eq!(i.status, IntentStatus::Confirmed);
		assert_eq!(i.confirmed_at, Some(1_700_000_100));
		assert_eq!(i.matched_tx_ref.as_deref(), Some("tx-1"));
	}

	#[test]
	fn test_terminal_states_are_sticky() {
		let mut confirmed = intent(0);
		confirmed.mark_confirmed("tx-1".into(), 10);
		assert!(!confirmed.mark_expired());
		assert!(!confirmed.mark_confirmed("tx-2".into(), 20));
		assert_eq!(confirmed.matched_tx_ref.as_deref(), Some("tx-1"));

		let mut expired = intent(0);
		expired.mark_expired();
		assert!(!expired.mark_confirmed("tx-3".into(), 30));
		assert_eq!(expired.status, IntentStatus::Expired);
		assert!(expired.confirmed_at.is_none());
	}

	#[test]
	fn test_expiry_boundary_is_exclusive() {
		let i = intent(100);
		assert!(!i.is_expired_at(i.expires_at));
		assert!(i.is_expired_at(i.expires_at + 1));
	}

	#[test]
	fn test_metadata_round_trips_verbatim() {
		let mut meta = HashMap::new();
		meta.insert("invoice".to_string(), serde_json::json!({"no": 42}));
		let i = PaymentIntent::new("p", 1, meta.clone(), 0, Duration::from_secs(60));

		let json = serde_json::to_string(&i).unwrap();
		let back: PaymentIntent = serde_json::from_str(&json).unwrap();
		assert_eq!(back.metadata, meta);
	}
}
