use crate::classifier::Classifier;
use crate::scale::{gas_fee, scale_base_units, NATIVE_DECIMALS};
use crate::{CanonicalTransaction, RawRecord, RawTokenTransfer, RawTransaction, RecordKind};
use tracing::warn;

const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Converts raw records into canonical transactions for one wallet on one
/// chain: sent/received/fee attribution, base-unit scaling and labeling.
pub struct Normalizer<'a> {
    classifier: &'a Classifier,
    chain: String,
    native_currency: String,
    wallet: String,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        classifier: &'a Classifier,
        chain: impl Into<String>,
        native_currency: impl Into<String>,
        wallet: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            chain: chain.into(),
            native_currency: native_currency.into(),
            wallet: wallet.into(),
        }
    }

    /// Normalize native-currency records from the transaction or
    /// internal-transaction feed.
    pub fn normalize_native(
        &self,
        records: &[RawTransaction],
        kind: RecordKind,
    ) -> Vec<CanonicalTransaction> {
        records
            .iter()
            .map(|tx| self.native_to_canonical(tx, kind))
            .collect()
    }

    /// Normalize token-transfer records. The feed carries no fee data.
    pub fn normalize_tokens(&self, records: &[RawTokenTransfer]) -> Vec<CanonicalTransaction> {
        records
            .iter()
            .map(|transfer| self.token_to_canonical(transfer))
            .collect()
    }

    fn native_to_canonical(&self, tx: &RawTransaction, kind: RecordKind) -> CanonicalTransaction {
        let is_sender = tx.from.eq_ignore_ascii_case(&self.wallet);
        let is_receiver = tx.to.eq_ignore_ascii_case(&self.wallet);
        let label = self.classifier.classify(RawRecord::Native(tx), &self.chain);

        let (sent_amount, sent_currency, fee_amount, fee_currency) = if is_sender {
            let fee = gas_fee(&tx.gas_used, &tx.gas_price);
            if fee.is_none() && kind == RecordKind::Transaction {
                warn!(
                    "Transaction {} has unparseable gas fields (gasUsed: '{}', gasPrice: '{}')",
                    tx.hash, tx.gas_used, tx.gas_price
                );
            }
            let fee_currency = fee.as_ref().map(|_| self.native_currency.clone());
            (
                Some(scale_base_units(&tx.value, NATIVE_DECIMALS)),
                Some(self.native_currency.clone()),
                fee,
                fee_currency,
            )
        } else {
            (None, None, None, None)
        };

        let (received_amount, received_currency) = if is_receiver {
            (
                Some(scale_base_units(&tx.value, NATIVE_DECIMALS)),
                Some(self.native_currency.clone()),
            )
        } else {
            (None, None)
        };

        CanonicalTransaction {
            date: tx.time_stamp.clone(),
            sent_amount,
            sent_currency,
            received_amount,
            received_currency,
            fee_amount,
            fee_currency,
            net_worth_amount: None,
            net_worth_currency: None,
            label: Some(label.as_str().to_string()),
            description: kind.as_str().to_string(),
            tx_hash: tx.hash.clone(),
        }
    }

    fn token_to_canonical(&self, transfer: &RawTokenTransfer) -> CanonicalTransaction {
        let is_sender = transfer.from.eq_ignore_ascii_case(&self.wallet);
        let is_receiver = transfer.to.eq_ignore_ascii_case(&self.wallet);
        let label = self
            .classifier
            .classify(RawRecord::Token(transfer), &self.chain);

        let decimals = transfer
            .token_decimal
            .trim()
            .parse::<u32>()
            .unwrap_or(DEFAULT_TOKEN_DECIMALS);

        let (sent_amount, sent_currency) = if is_sender {
            (
                Some(scale_base_units(&transfer.value, decimals)),
                Some(transfer.token_symbol.clone()),
            )
        } else {
            (None, None)
        };

        let (received_amount, received_currency) = if is_receiver {
            (
                Some(scale_base_units(&transfer.value, decimals)),
                Some(transfer.token_symbol.clone()),
            )
        } else {
            (None, None)
        };

        CanonicalTransaction {
            date: transfer.time_stamp.clone(),
            sent_amount,
            sent_currency,
            received_amount,
            received_currency,
            fee_amount: None,
            fee_currency: None,
            net_worth_amount: None,
            net_worth_currency: None,
            label: Some(label.as_str().to_string()),
            description: RecordKind::TokenTransfer.as_str().to_string(),
            tx_hash: transfer.hash.clone(),
        }
    }
}
