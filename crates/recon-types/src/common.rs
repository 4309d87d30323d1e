//! Common types used throughout the reconciliation engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction reference assigned by the ledger
pub type TxRef = String;

/// Ledger account address
pub type LedgerAddress = String;

/// Timestamp (Unix seconds)
pub type Timestamp = u64;

/// Amount in the ledger's smallest indivisible unit
pub type Amount = u64;

/// Unique identifier for various entities.
///
/// Generated from a v4 UUID so that an id handed out to a caller is not
/// guessable and can act as a capability token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T> {
	value: uuid::Uuid,
	#[serde(skip)]
	_phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Id<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Id<T> {
	pub fn new() -> Self {
		Self {
			value: uuid::Uuid::new_v4(),
			_phantom: std::marker::PhantomData,
		}
	}

	/// Parses an id from its string form, as supplied back by callers.
	pub fn parse(s: &str) -> Result<Self, uuid::Error> {
		Ok(Self {
			value: uuid::Uuid::parse_str(s)?,
			_phantom: std::marker::PhantomData,
		})
	}
}

impl<T> fmt::Display for Id<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.value)
	}
}
