//! Generic CSV export of the canonical columns.

use std::path::Path;

use anyhow::Context;
use ledger_core::CanonicalTransaction;

pub fn write(path: &Path, rows: &[CanonicalTransaction]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot open {} for writing", path.display()))?;

    // csv only emits serde headers alongside a record, so an empty
    // export still needs the header row written explicitly.
    if rows.is_empty() {
        writer.write_record(CanonicalTransaction::COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::sample_row;
    use tempfile::tempdir;

    #[test]
    fn writes_canonical_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write(&path, &[sample_row()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Sent Amount,Sent Currency,Received Amount,Received Currency,\
             Fee Amount,Fee Currency,Net Worth Amount,Net Worth Currency,Label,\
             Description,TxHash"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1672531200,1,ETH,,,0.000021,ETH,,,transfer,transaction,0xabc"
        );
    }

    #[test]
    fn empty_export_still_has_the_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write(&path, &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Sent Amount"));
        assert_eq!(text.lines().count(), 1);
    }
}
