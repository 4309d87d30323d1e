//! Configuration types for the reconciliation service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level service configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: ServiceConfig,
	pub treasury: TreasuryConfig,
	#[serde(default)]
	pub intents: IntentConfig,
	#[serde(default)]
	pub matcher: MatcherSettings,
	pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
	#[serde(default = "default_service_name")]
	pub name: String,
	#[serde(default = "default_http_port")]
	pub http_port: u16,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			name: default_service_name(),
			http_port: default_http_port(),
			log_level: default_log_level(),
		}
	}
}

/// The single receiving account. Static for the process lifetime; the
/// engine never generates per-payment addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryConfig {
	pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
	/// How long a created intent stays payable.
	#[serde(default = "default_ttl_secs")]
	pub ttl_secs: u64,
	/// How long terminal intents are kept before the sweep removes them.
	#[serde(default = "default_retention_secs")]
	pub retention_secs: u64,
	#[serde(default = "default_sweep_interval_secs")]
	pub sweep_interval_secs: u64,
}

impl Default for IntentConfig {
	fn default() -> Self {
		Self {
			ttl_secs: default_ttl_secs(),
			retention_secs: default_retention_secs(),
			sweep_interval_secs: default_sweep_interval_secs(),
		}
	}
}

impl IntentConfig {
	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_secs)
	}

	pub fn retention(&self) -> Duration {
		Duration::from_secs(self.retention_secs)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_secs(self.sweep_interval_secs)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherSettings {
	/// Allowed deviation between expected and received amount, in the
	/// ledger's smallest indivisible unit.
	#[serde(default = "default_amount_tolerance")]
	pub amount_tolerance: u64,
	/// Recent transactions fetched per check.
	#[serde(default = "default_candidate_limit")]
	pub candidate_limit: usize,
	#[serde(default = "default_query_timeout_secs")]
	pub query_timeout_secs: u64,
}

impl Default for MatcherSettings {
	fn default() -> Self {
		Self {
			amount_tolerance: default_amount_tolerance(),
			candidate_limit: default_candidate_limit(),
			query_timeout_secs: default_query_timeout_secs(),
		}
	}
}

impl MatcherSettings {
	pub fn query_timeout(&self) -> Duration {
		Duration::from_secs(self.query_timeout_secs)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
	pub indexer: IndexerConfig,
	pub node: NodeConfig,
}

/// Third-party indexing service, the primary data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
	pub base_url: String,
	#[serde(default)]
	pub api_key: Option<String>,
}

/// Direct ledger node, the fallback data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
	pub rpc_url: String,
}

fn default_service_name() -> String {
	"recon-service".to_string()
}

fn default_http_port() -> u16 {
	8080
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_ttl_secs() -> u64 {
	30 * 60
}

fn default_retention_secs() -> u64 {
	24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
	60 * 60
}

fn default_amount_tolerance() -> u64 {
	1000
}

fn default_candidate_limit() -> usize {
	10
}

fn default_query_timeout_secs() -> u64 {
	10
}
