//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::application::services::DefiService;
use crate::domain::pool::{price_impact, quote_swap};
use crate::infrastructure::http;
use crate::infrastructure::ledger::submitter_for;
use crate::infrastructure::storage::SnapshotStore;
use crate::shared::clock::{Clock, EstimatedChainTip, SystemClock};
use crate::shared::config::ServiceConfig;
use crate::shared::errors::AppError;
use crate::shared::types::Amount;

#[derive(Parser)]
#[command(name = "runeswap")]
#[command(version, about = "Rune token swap, liquidity pool and yield farm service")]
pub struct Cli {
    /// Path to config file (defaults to ./Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides config)
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Price a swap against the given reserves without starting the service
    Quote {
        #[arg(long)]
        amount_in: String,

        #[arg(long)]
        reserve_in: String,

        #[arg(long)]
        reserve_out: String,

        /// Fee in tenths of a percent (config default when omitted)
        #[arg(long)]
        fee: Option<u32>,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: ServiceConfig) -> Result<(), AppError> {
        match command {
            Commands::Serve { host, port } => Self::execute_serve(host, port, config).await,
            Commands::Quote {
                amount_in,
                reserve_in,
                reserve_out,
                fee,
            } => {
                let fee = fee.unwrap_or(config.pools.default_fee);
                println!("{}", format_quote(&amount_in, &reserve_in, &reserve_out, fee)?);
                Ok(())
            }
        }
    }

    async fn execute_serve(
        host: Option<String>,
        port: Option<u16>,
        mut config: ServiceConfig,
    ) -> Result<(), AppError> {
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid listen address: {}", e)))?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let chain = Arc::new(EstimatedChainTip::new(
            config.chain.anchor_height,
            config.chain.anchor_time_ms,
            config.chain.block_interval_ms,
            clock.clone(),
        ));
        let submitter = submitter_for(&config.execution, clock.clone());
        let service = Arc::new(DefiService::new(
            config.pools.clone(),
            clock,
            chain,
            submitter,
        ));

        let store = config.storage.snapshot_path.as_deref().map(SnapshotStore::new);
        if let Some(store) = &store {
            if let Some(snapshot) = store.load()? {
                service.restore(snapshot).await?;
            }
        }

        info!(
            submitter = service.submitter_name(),
            block = service.current_block(),
            default_fee = config.pools.default_fee,
            "starting runeswap"
        );
        http::serve(http::router(service.clone()), addr, shutdown_signal()).await?;

        if let Some(store) = &store {
            store.save(&service.export_snapshot().await)?;
        }
        info!("runeswap stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Offline quote rendered for the terminal
pub fn format_quote(
    amount_in: &str,
    reserve_in: &str,
    reserve_out: &str,
    fee: u32,
) -> Result<String, AppError> {
    let parse = |raw: &str| Amount::parse(raw).map_err(|e| AppError::ConfigError(e.to_string()));
    let (amount_in, reserve_in, reserve_out) = (parse(amount_in)?, parse(reserve_in)?, parse(reserve_out)?);

    let amount_out = quote_swap(&amount_in, &reserve_in, &reserve_out, fee)
        .map_err(|e| AppError::ConfigError(e.to_string()))?;
    let impact = price_impact(&amount_in, &reserve_in, &reserve_out)
        .map_err(|e| AppError::ConfigError(e.to_string()))?;

    Ok(format!(
        "amount out:   {}\nprice impact: {}\nfee:          {}/1000",
        amount_out, impact, fee
    ))
}
