//! Wallet processing pipeline.
//!
//! Pulls the three explorer feeds for a wallet, normalizes them into
//! canonical rows, merges and filters by date, then hands the result to
//! the writers. Batch mode fans out over wallets with bounded
//! concurrency so a large address file does not hammer the explorer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use config_manager::SystemConfig;
use explorer_client::ExplorerClient;
use ledger_core::classifier::Classifier;
use ledger_core::filter::{combine_and_sort, filter_by_date_range};
use ledger_core::normalizer::Normalizer;
use ledger_core::{CanonicalTransaction, RecordKind};

use crate::writers::{self, OutputFormat};

/// Fetch and normalize every record for one wallet on one chain.
///
/// Feed-level failures already degrade to empty lists inside the
/// client, so this always produces whatever subset could be fetched.
pub async fn process_wallet(
    client: &ExplorerClient,
    classifier: &Classifier,
    chain_id: &str,
    wallet: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Vec<CanonicalTransaction> {
    let transactions = client.get_transactions(wallet).await;
    let token_transfers = client.get_token_transfers(wallet).await;
    let internal_transactions = client.get_internal_transactions(wallet).await;

    info!(
        wallet,
        chain = chain_id,
        transactions = transactions.len(),
        token_transfers = token_transfers.len(),
        internal = internal_transactions.len(),
        "fetched explorer feeds"
    );

    let normalizer = Normalizer::new(
        classifier,
        chain_id,
        &client.chain().native_currency,
        wallet,
    );

    let combined = combine_and_sort(
        normalizer.normalize_native(&transactions, RecordKind::Transaction),
        normalizer.normalize_tokens(&token_transfers),
        normalizer.normalize_native(&internal_transactions, RecordKind::Internal),
    );

    filter_by_date_range(combined, start_date, end_date)
}

/// Output path for one wallet's export.
fn wallet_output_path(output_dir: &str, wallet: &str, format: OutputFormat) -> PathBuf {
    PathBuf::from(output_dir).join(format!("{}_transactions.{}", wallet, format.extension()))
}

/// Run the full export for a batch of wallets.
///
/// An unknown chain is a hard error before any work starts. Per-wallet
/// failures after that point are logged and skipped so one bad wallet
/// cannot sink the rest of the batch.
pub async fn process_batch(
    config: &SystemConfig,
    chain_id: &str,
    wallets: &[String],
    format: OutputFormat,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let client = Arc::new(
        ExplorerClient::new(chain_id, config)
            .with_context(|| format!("cannot create explorer client for chain {chain_id}"))?,
    );
    let classifier = Arc::new(Classifier::from_config(config));
    let output_dir = config.batch.output_dir.clone();
    let total = wallets.len();

    info!(chain = chain_id, wallets = total, ?format, "starting batch export");

    let results: Vec<(String, anyhow::Result<usize>)> = stream::iter(
        wallets.iter().cloned().enumerate().map(|(index, wallet)| {
            let client = Arc::clone(&client);
            let classifier = Arc::clone(&classifier);
            let output_dir = output_dir.clone();
            let chain_id = chain_id.to_string();
            async move {
                info!(wallet = %wallet, "processing wallet ({}/{})", index + 1, total);
                let rows = process_wallet(
                    &client,
                    &classifier,
                    &chain_id,
                    &wallet,
                    start_date,
                    end_date,
                )
                .await;
                if rows.is_empty() {
                    warn!(wallet = %wallet, "no transactions in range");
                }
                let path = wallet_output_path(&output_dir, &wallet, format);
                let written = rows.len();
                let outcome = writers::write(&path, &rows, format, &chain_id)
                    .map(|_| written)
                    .with_context(|| format!("failed to write {}", path.display()));
                (wallet, outcome)
            }
        }),
    )
    .buffer_unordered(config.batch.max_concurrent_wallets)
    .collect()
    .await;

    let mut succeeded = 0usize;
    for (wallet, outcome) in results {
        match outcome {
            Ok(count) => {
                info!(wallet = %wallet, rows = count, "export written");
                succeeded += 1;
            }
            Err(err) => error!(wallet = %wallet, "wallet export failed: {err:#}"),
        }
    }

    info!(succeeded, total, "batch export finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_wallet_and_format_extension() {
        let path = wallet_output_path("output", "0xabc", OutputFormat::Koinly);
        assert_eq!(path, PathBuf::from("output/0xabc_transactions.koinly"));
    }
}
