//! CryptoTaxCalculator CSV export.
//!
//! CTC wants an operation type per row instead of sent/received columns.
//! The type is inferred from which sides of the transaction are
//! populated, then refined for swaps involving a fiat leg.

use std::path::Path;

use anyhow::Context;
use ledger_core::CanonicalTransaction;

const HEADER: [&str; 9] = [
    "Timestamp (UTC)",
    "Type",
    "Base Currency",
    "Base Amount",
    "Quote Currency",
    "Quote Amount",
    "Fee Currency",
    "Fee Amount",
    "ID",
];

const FIAT_CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "AUD"];

struct CtcRow<'a> {
    kind: &'a str,
    base_currency: &'a str,
    base_amount: &'a str,
    quote_currency: &'a str,
    quote_amount: &'a str,
}

fn is_fiat(currency: Option<&str>) -> bool {
    currency.map_or(false, |c| FIAT_CURRENCIES.contains(&c))
}

/// Infer the CTC row type from the populated sides of the transaction.
fn infer_row(tx: &CanonicalTransaction) -> CtcRow<'_> {
    let sent_amount = tx.sent_amount.as_deref().filter(|s| !s.is_empty());
    let sent_currency = tx.sent_currency.as_deref().unwrap_or("");
    let received_amount = tx.received_amount.as_deref().filter(|s| !s.is_empty());
    let received_currency = tx.received_currency.as_deref().unwrap_or("");

    match (sent_amount, received_amount) {
        (Some(sent), Some(received)) => {
            // A swap out of fiat is a buy of the received asset; every
            // other two-sided row is a sell of the sent asset.
            let fiat_buy = tx.label.as_deref() == Some("swap")
                && is_fiat(tx.sent_currency.as_deref())
                && !is_fiat(tx.received_currency.as_deref());
            if fiat_buy {
                CtcRow {
                    kind: "buy",
                    base_currency: received_currency,
                    base_amount: received,
                    quote_currency: sent_currency,
                    quote_amount: sent,
                }
            } else {
                CtcRow {
                    kind: "sell",
                    base_currency: sent_currency,
                    base_amount: sent,
                    quote_currency: received_currency,
                    quote_amount: received,
                }
            }
        }
        (Some(sent), None) => CtcRow {
            kind: "send",
            base_currency: sent_currency,
            base_amount: sent,
            quote_currency: "",
            quote_amount: "",
        },
        (None, Some(received)) => CtcRow {
            kind: "receive",
            base_currency: received_currency,
            base_amount: received,
            quote_currency: "",
            quote_amount: "",
        },
        (None, None) => CtcRow {
            kind: "",
            base_currency: "",
            base_amount: "",
            quote_currency: "",
            quote_amount: "",
        },
    }
}

pub fn write(path: &Path, rows: &[CanonicalTransaction]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot open {} for writing", path.display()))?;
    writer.write_record(HEADER)?;

    for row in rows {
        let ctc = infer_row(row);
        writer.write_record([
            row.date.as_str(),
            ctc.kind,
            ctc.base_currency,
            ctc.base_amount,
            ctc.quote_currency,
            ctc.quote_amount,
            row.fee_currency.as_deref().unwrap_or(""),
            row.fee_amount.as_deref().unwrap_or(""),
            row.tx_hash.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
