use std::path::PathBuf;

use anyhow::bail;
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config_manager::SystemConfig;
use tx_exporter::addresses::{normalize_address_list, read_addresses_from_file};
use tx_exporter::pipeline::process_batch;
use tx_exporter::writers::OutputFormat;

/// Export wallet transaction history from block explorers into
/// accounting-tool formats.
#[derive(Debug, Parser)]
#[command(name = "tx_exporter", version, about)]
struct Cli {
    /// Wallet address(es) to export, comma separated
    #[arg(long)]
    wallet: Option<String>,

    /// File with one wallet address per line (or a CSV containing addresses)
    #[arg(long)]
    address_file: Option<PathBuf>,

    /// Only include transactions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Only include transactions on or before this date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Chain to query
    #[arg(long, default_value = "mintchain")]
    chain: String,
}

/// Gather candidate addresses from the CLI, an address file, and
/// environment fallbacks, in that order.
fn collect_addresses(cli: &Cli) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(wallet) = &cli.wallet {
        candidates.extend(wallet.split(',').map(|s| s.trim().to_string()));
    }

    if let Some(path) = &cli.address_file {
        candidates.extend(read_addresses_from_file(path));
    }

    if candidates.is_empty() {
        if let Ok(list) = std::env::var("WALLET_ADDRESSES") {
            candidates.extend(list.split(',').map(|s| s.trim().to_string()));
        } else if let Ok(single) = std::env::var("WALLET_ADDRESS") {
            candidates.push(single.trim().to_string());
        }
    }

    candidates
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = SystemConfig::load()?;

    let candidates = collect_addresses(&cli);
    let candidate_count = candidates.len();
    let wallets = normalize_address_list(candidates);
    if wallets.is_empty() {
        bail!(
            "no valid wallet addresses given; use --wallet, --address-file, \
             or the WALLET_ADDRESSES environment variable"
        );
    }
    if wallets.len() < candidate_count {
        warn!(
            dropped = candidate_count - wallets.len(),
            "some addresses were invalid or duplicated and have been dropped"
        );
    }

    info!(
        chain = %cli.chain,
        wallets = wallets.len(),
        format = ?cli.format,
        "starting transaction export"
    );

    process_batch(
        &config,
        &cli.chain,
        &wallets,
        cli.format,
        cli.start_date,
        cli.end_date,
    )
    .await
}
