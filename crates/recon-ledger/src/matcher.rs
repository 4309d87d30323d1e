//! Dual-source transaction matching.
//!
//! Given a pending intent, the matcher asks an ordered list of data sources
//! for recent treasury transactions and evaluates candidates against the
//! intent's amount and timing constraints. The first source that answers is
//! authoritative for the attempt; sources that fail or time out are skipped.

use crate::LedgerInterface;
use recon_types::{Amount, LedgerAddress, LedgerTransaction, MatchedPayment, PaymentIntent};
use std::time::Duration;
use tracing::{debug, warn};

/// Matching parameters, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
	/// The single ledger account that receives all payments.
	pub treasury_address: LedgerAddress,
	/// Maximum absolute deviation between expected and received amount, in
	/// smallest units. Absorbs fee deltas observed on the receiving side.
	pub amount_tolerance: Amount,
	/// How many recent transactions to fetch per attempt. Bounded on
	/// purpose: a payment buried behind more newer transactions than this
	/// is caught on a later poll.
	pub candidate_limit: usize,
	/// Upper bound on a single data-source query.
	pub query_timeout: Duration,
}

/// Outcome of one matching attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
	/// A ledger transaction satisfied the intent.
	Matched(MatchedPayment),
	/// A source answered and showed no satisfying transaction.
	NoMatch,
	/// No source could answer. Indistinguishable from "not paid yet" for
	/// callers, which retry by polling.
	Inconclusive,
}

/// Evaluates pending intents against the ledger through an ordered list of
/// data sources.
pub struct TransactionMatcher {
	sources: Vec<Box<dyn LedgerInterface>>,
	config: MatcherConfig,
}

impl TransactionMatcher {
	/// `sources` are tried in order; the reference composition is the
	/// indexing service first with the ledger node as fallback.
	pub fn new(sources: Vec<Box<dyn LedgerInterface>>, config: MatcherConfig) -> Self {
		Self { sources, config }
	}

	pub fn config(&self) -> &MatcherConfig {
		&self.config
	}

	/// Attempts to find a transaction satisfying `intent`.
	///
	/// A successful query is definitive for this attempt: a clean no-match
	/// from the primary source does not consult the fallback. Only a failed
	/// or timed-out query moves on to the next source.
	pub async fn find_match(&self, intent: &PaymentIntent) -> MatchOutcome {
		for source in &self.sources {
			let fetched = tokio::time::timeout(
				self.config.query_timeout,
				source.recent_transactions(&self.config.treasury_address, self.config.candidate_limit),
			)
			.await;

			let transactions = match fetched {
				Ok(Ok(transactions)) => transactions,
				Ok(Err(e)) => {
					warn!(
						"Ledger source {} failed for intent {}: {}",
						source.name(),
						intent.id,
						e
					);
					continue;
				}
				Err(_) => {
					warn!(
						"Ledger source {} timed out after {:?} for intent {}",
						source.name(),
						self.config.query_timeout,
						intent.id
					);
					continue;
				}
			};

			debug!(
				"Ledger source {} returned {} candidates for intent {}",
				source.name(),
				transactions.len(),
				intent.id
			);

			return match self.evaluate(intent, &transactions) {
				Some(matched) => MatchOutcome::Matched(matched),
				None => MatchOutcome::NoMatch,
			};
		}

		MatchOutcome::Inconclusive
	}

	/// Applies the candidate filters in delivery order; first match wins.
	/// No ranking: at most one legitimate match is expected per intent.
	fn evaluate(
		&self,
		intent: &PaymentIntent,
		transactions: &[LedgerTransaction],
	) -> Option<MatchedPayment> {
		for tx in transactions {
			if !tx.success {
				continue;
			}
			// A transaction dated before the intent existed can never be
			// its payment, even on an exact amount match.
			if tx.timestamp < intent.created_at {
				continue;
			}
			let received = match tx.credited(&self.config.treasury_address) {
				Some(received) => received,
				None => continue,
			};
			// Amounts past u64 cannot be expressed as an expected amount,
			// so they cannot be within tolerance of one either.
			let received = match Amount::try_from(received) {
				Ok(received) => received,
				Err(_) => continue,
			};
			if received.abs_diff(intent.expected_amount) <= self.config.amount_tolerance {
				return Some(MatchedPayment {
					tx_ref: tx.tx_ref.clone(),
					amount: received,
					timestamp: tx.timestamp,
				});
			}
		}
		None
	}
}
