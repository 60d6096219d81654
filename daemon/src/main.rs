//! vouchd: entry point for running an attestation verification ledger.

mod config;

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vouch_ledger::{AttestationRegistry, Ledger, StaticRegistry, SystemClock};
use vouch_rpc::{RpcServer, RpcState};
use vouch_store::keys::META_ACCESS_STATE;
use vouch_store::MetaStore;
use vouch_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use vouch_utils::{init_logging, LogFormat};

use crate::config::{load_registry_file, DaemonConfig};

#[derive(Parser)]
#[command(name = "vouchd", about = "Attestation verification and reputation ledger daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "VOUCH_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for ledger storage.
    #[arg(long, env = "VOUCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// RPC server port.
    #[arg(long, env = "VOUCH_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOUCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOUCH_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Open the ledger and serve RPC until Ctrl-C.
    Run,
    /// Print statistics, parameters and safety state as JSON.
    Inspect,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}

fn open_store(config: &DaemonConfig) -> anyhow::Result<LmdbEnvironment> {
    let dir = &config.data_dir;
    let is_empty = dir
        .read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true);
    if !is_empty {
        check_data_dir(dir).map_err(anyhow::Error::msg)?;
    }
    let env = LmdbEnvironment::open(dir, config.map_size_bytes())
        .with_context(|| format!("opening LMDB at {}", dir.display()))?;

    let report = check_integrity(env.env())?;
    if !report.is_healthy() {
        for error in &report.errors {
            tracing::error!("integrity check: {error}");
        }
        bail!("LMDB integrity check failed at {}", dir.display());
    }
    tracing::info!(
        databases = report.databases_checked,
        entries = report.total_entries,
        "integrity check passed"
    );
    Ok(env)
}

fn open_registry(config: &DaemonConfig) -> anyhow::Result<Box<dyn AttestationRegistry>> {
    let registry = match &config.registry_file {
        Some(path) => {
            let registry = load_registry_file(path)?;
            tracing::info!(
                path = %path.display(),
                registries = registry.registry_count(),
                "loaded registry file"
            );
            registry
        }
        None => {
            tracing::warn!("no registry_file configured, every attestation will verify as invalid");
            StaticRegistry::new()
        }
    };
    Ok(Box::new(registry))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {e}");
    }
    tracing::info!("shutdown signal received");
}

async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    config.validate()?;
    let store = open_store(&config)?;
    let registry = open_registry(&config)?;
    let ledger = Ledger::open(
        config.ledger.clone(),
        Box::new(store),
        registry,
        Box::new(SystemClock),
    )?;

    let stats = ledger.global_statistics();
    tracing::info!(
        rpc_port = config.rpc_port,
        verifications = stats.total_verifications,
        active_verifiers = stats.active_verifiers,
        "starting vouchd"
    );

    let server = RpcServer::new(config.rpc_port, Arc::new(RpcState::new(ledger)));
    server.start(shutdown_signal()).await?;
    tracing::info!("vouchd exited cleanly");
    Ok(())
}

/// `inspect` never creates a store, so the data file must already exist.
fn require_existing_store(dir: &Path) -> anyhow::Result<()> {
    if !dir.join("data.mdb").is_file() {
        bail!("no ledger found at {}", dir.display());
    }
    Ok(())
}

fn inspect(config: DaemonConfig) -> anyhow::Result<()> {
    require_existing_store(&config.data_dir)?;
    let store = open_store(&config)?;
    if store.get_meta(META_ACCESS_STATE)?.is_none() {
        bail!("no ledger found at {}", config.data_dir.display());
    }
    let ledger = Ledger::open(
        config.ledger.clone(),
        Box::new(store),
        Box::new(StaticRegistry::new()),
        Box::new(SystemClock),
    )?;
    let report = serde_json::json!({
        "data_dir": config.data_dir,
        "statistics": ledger.global_statistics(),
        "parameters": ledger.consensus_parameters(),
        "safety_state": ledger.safety_state(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    if let Err(e) = init_logging(config.log_format, &config.log_level) {
        eprintln!("logging already initialised: {e}");
    }

    match cli.command {
        Command::Run => run(config).await,
        Command::Inspect => inspect(config),
    }
}
