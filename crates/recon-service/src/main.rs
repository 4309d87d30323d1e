use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recon_config::{Config, ConfigLoader};
use recon_core::{EngineConfig, ReconEngine, Sweeper};
use recon_ledger::{IndexerAdapter, MatcherConfig, NodeAdapter, TransactionMatcher};
use recon_store::MemoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;

#[derive(Parser)]
#[command(name = "recon-service")]
#[command(about = "Payment reconciliation service", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "RECON_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the reconciliation service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("Starting payment reconciliation service");
	info!("Loading configuration from: {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	info!("Configuration loaded successfully");
	info!("Treasury address: {}", config.treasury.address);
	info!("HTTP port: {}", config.service.http_port);

	let engine = build_engine(&config).context("Failed to build engine")?;

	// Periodic cleanup runs independently of any request.
	let sweeper = Sweeper::spawn(engine.clone(), config.intents.sweep_interval());

	let api = api::ApiServer::new(config.service.http_port, engine.clone());
	let http_handle = tokio::spawn(async move { api.run().await });

	info!("Payment reconciliation service started successfully");

	setup_shutdown_signal().await;

	info!("Shutdown signal received, stopping services...");

	sweeper.shutdown();
	http_handle.abort();

	info!("Payment reconciliation service stopped");
	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	info!("Configuration is valid");
	info!("Service name: {}", config.service.name);
	info!("Treasury address: {}", config.treasury.address);
	info!("Indexer: {}", config.ledger.indexer.base_url);
	info!("Node RPC: {}", config.ledger.node.rpc_url);
	info!(
		"Intent TTL: {}s, retention: {}s, sweep every {}s",
		config.intents.ttl_secs, config.intents.retention_secs, config.intents.sweep_interval_secs
	);

	Ok(())
}

/// Wires adapters, matcher, store and engine from the loaded configuration.
fn build_engine(config: &Config) -> Result<Arc<ReconEngine>> {
	let query_timeout = config.matcher.query_timeout();

	let indexer = IndexerAdapter::new(
		&config.ledger.indexer.base_url,
		config.ledger.indexer.api_key.clone(),
		query_timeout,
	)
	.context("Failed to build indexer adapter")?;
	let node = NodeAdapter::new(&config.ledger.node.rpc_url, query_timeout)
		.context("Failed to build node adapter")?;

	// Indexer first; the node answers when the indexer cannot.
	let matcher = TransactionMatcher::new(
		vec![Box::new(indexer), Box::new(node)],
		MatcherConfig {
			treasury_address: config.treasury.address.clone(),
			amount_tolerance: config.matcher.amount_tolerance,
			candidate_limit: config.matcher.candidate_limit,
			query_timeout,
		},
	);

	let engine = ReconEngine::new(
		Arc::new(MemoryStore::new()),
		Arc::new(matcher),
		EngineConfig {
			treasury_address: config.treasury.address.clone(),
			intent_ttl: config.intents.ttl(),
			retention: config.intents.retention(),
		},
	);

	Ok(Arc::new(engine))
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
