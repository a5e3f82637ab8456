//! Pretty-printed JSON export.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use ledger_core::CanonicalTransaction;

pub fn write(path: &Path, rows: &[CanonicalTransaction]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open {} for writing", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), rows)
        .with_context(|| format!("cannot serialize transactions to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::sample_row;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_the_external_column_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write(&path, &[sample_row()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["Sent Amount"], "1");
        assert_eq!(parsed[0]["Received Amount"], serde_json::Value::Null);
        assert_eq!(parsed[0]["TxHash"], "0xabc");
    }

    #[test]
    fn empty_export_is_an_empty_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        write(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }
}
