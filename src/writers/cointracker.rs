//! CoinTracker CSV export.
//!
//! CoinTracker swaps the sent/received column order relative to the
//! canonical layout and calls the label a "Tag".

use std::path::Path;

use anyhow::Context;
use ledger_core::CanonicalTransaction;

const HEADER: [&str; 8] = [
    "Date",
    "Received Quantity",
    "Received Currency",
    "Sent Quantity",
    "Sent Currency",
    "Fee Amount",
    "Fee Currency",
    "Tag",
];

pub fn write(path: &Path, rows: &[CanonicalTransaction]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot open {} for writing", path.display()))?;
    writer.write_record(HEADER)?;

    for row in rows {
        writer.write_record([
            row.date.as_str(),
            row.received_amount.as_deref().unwrap_or(""),
            row.received_currency.as_deref().unwrap_or(""),
            row.sent_amount.as_deref().unwrap_or(""),
            row.sent_currency.as_deref().unwrap_or(""),
            row.fee_amount.as_deref().unwrap_or(""),
            row.fee_currency.as_deref().unwrap_or(""),
            row.label.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
