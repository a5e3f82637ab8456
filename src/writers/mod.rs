//! Output writers for the supported accounting-tool formats.

mod cointracker;
mod cryptotaxcalculator;
mod csv_writer;
mod json_writer;
mod koinly;

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;

use ledger_core::CanonicalTransaction;

/// Supported export formats. The CLI value doubles as the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    Cointracker,
    Cryptotaxcalculator,
    Koinly,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Cointracker => "cointracker",
            OutputFormat::Cryptotaxcalculator => "cryptotaxcalculator",
            OutputFormat::Koinly => "koinly",
        }
    }
}

/// Write `rows` to `path` in the requested format, creating the parent
/// directory if it does not exist yet.
pub fn write(
    path: &Path,
    rows: &[CanonicalTransaction],
    format: OutputFormat,
    chain: &str,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create output directory {}", parent.display()))?;
        }
    }

    match format {
        OutputFormat::Csv => csv_writer::write(path, rows),
        OutputFormat::Json => json_writer::write(path, rows),
        OutputFormat::Cointracker => cointracker::write(path, rows),
        OutputFormat::Cryptotaxcalculator => cryptotaxcalculator::write(path, rows),
        OutputFormat::Koinly => koinly::write(path, rows, chain),
    }
}

#[cfg(test)]
pub(crate) fn sample_row() -> CanonicalTransaction {
    CanonicalTransaction {
        date: "1672531200".into(),
        sent_amount: Some("1".into()),
        sent_currency: Some("ETH".into()),
        received_amount: None,
        received_currency: None,
        fee_amount: Some("0.000021".into()),
        fee_currency: Some("ETH".into()),
        net_worth_amount: None,
        net_worth_currency: None,
        label: Some("transfer".into()),
        description: "transaction".into(),
        tx_hash: "0xabc".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extension_matches_cli_value() {
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Koinly.extension(), "koinly");
        assert_eq!(
            OutputFormat::Cryptotaxcalculator.extension(),
            "cryptotaxcalculator"
        );
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/w_transactions.csv");
        write(&path, &[sample_row()], OutputFormat::Csv, "mintchain").unwrap();
        assert!(path.exists());
    }
}
