//! Lifecycle controller for payment intents.
//!
//! Orchestrates intent creation, on-demand status checks against the ledger,
//! and the periodic expiration/cleanup sweep. The engine owns the only
//! mutable shared state (the intent store) and serializes transitions with a
//! per-intent lock table.

pub mod engine;
pub mod sweeper;

pub use engine::{EngineConfig, ReconEngine, SweepOutcome};
pub use sweeper::Sweeper;
