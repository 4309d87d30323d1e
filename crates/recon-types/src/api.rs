//! Request and response projections exposed by the engine.
//!
//! These are the exact shapes the HTTP layer wraps 1:1. They deliberately
//! project a subset of [`PaymentIntent`](crate::intent::PaymentIntent) so the
//! full record never leaves the engine.

use crate::common::{Amount, LedgerAddress, Timestamp, TxRef};
use crate::intent::{IntentId, IntentStatus, PaymentIntent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller input for creating a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
	pub payer_reference: String,
	/// Expected amount in the ledger's smallest indivisible unit.
	pub expected_amount: Amount,
	#[serde(default)]
	pub metadata: HashMap<String, serde_json::Value>,
}

/// Returned from intent creation: everything the payer needs to settle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentReceipt {
	pub id: IntentId,
	pub treasury_address: LedgerAddress,
	pub expected_amount: Amount,
	pub expires_at: Timestamp,
}

/// Result of a status check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
	pub id: IntentId,
	pub payer_reference: String,
	pub confirmed: bool,
	pub status: IntentStatus,
	pub created_at: Timestamp,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub confirmed_at: Option<Timestamp>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub matched_tx_ref: Option<TxRef>,
}

impl StatusReport {
	pub fn from_intent(intent: &PaymentIntent) -> Self {
		Self {
			id: intent.id.clone(),
			payer_reference: intent.payer_reference.clone(),
			confirmed: intent.status == IntentStatus::Confirmed,
			status: intent.status,
			created_at: intent.created_at,
			confirmed_at: intent.confirmed_at,
			matched_tx_ref: intent.matched_tx_ref.clone(),
		}
	}
}

/// One still-pending intent in a per-payer listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingIntent {
	pub id: IntentId,
	pub payer_reference: String,
	pub expected_amount: Amount,
	pub created_at: Timestamp,
	pub expires_at: Timestamp,
}

impl PendingIntent {
	pub fn from_intent(intent: &PaymentIntent) -> Self {
		Self {
			id: intent.id.clone(),
			payer_reference: intent.payer_reference.clone(),
			expected_amount: intent.expected_amount,
			created_at: intent.created_at,
			expires_at: intent.expires_at,
		}
	}
}
