//! Koinly CSV export.
//!
//! Koinly consumes the canonical column layout directly, but it rejects
//! labels outside its own vocabulary. Plain transfers on mintchain are
//! blanked so Koinly infers the direction itself; reward-style labels
//! pass through unchanged.

use std::path::Path;

use anyhow::Context;
use ledger_core::CanonicalTransaction;

const MINTCHAIN_BLANKED: [&str; 2] = ["transfer", "token_transfer"];

fn remap_label(label: Option<&str>, chain: &str) -> Option<String> {
    let label = label?;
    if chain == "mintchain" && MINTCHAIN_BLANKED.contains(&label) {
        Some(String::new())
    } else {
        Some(label.to_string())
    }
}

pub fn write(path: &Path, rows: &[CanonicalTransaction], chain: &str) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot open {} for writing", path.display()))?;

    if rows.is_empty() {
        writer.write_record(CanonicalTransaction::COLUMNS)?;
    }
    for row in rows {
        let remapped = CanonicalTransaction {
            label: remap_label(row.label.as_deref(), chain),
            ..row.clone()
        };
        writer.serialize(&remapped)?;
    }
    writer.flush()?;
    Ok(())
}
