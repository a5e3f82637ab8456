pub mod classifier;
pub mod filter;
pub mod normalizer;
pub mod scale;

pub use classifier::{Classifier, Label, DEAD_ADDRESS, ZERO_ADDRESS};
pub use filter::{combine_and_sort, filter_by_date_range};
pub use normalizer::Normalizer;
pub use scale::scale_base_units;

use serde::{Deserialize, Serialize};

/// A native-currency transaction or internal transfer, as the Etherscan
/// `txlist` / `txlistinternal` actions return it. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTransaction {
    pub hash: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(rename = "gasUsed", default)]
    pub gas_used: String,
    // Internal transfers carry no gas price; the fee lives on the parent.
    #[serde(rename = "gasPrice", default)]
    pub gas_price: String,
}

/// One ERC-20/721 token movement from the `tokentx` action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTokenTransfer {
    pub hash: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(rename = "tokenSymbol", default)]
    pub token_symbol: String,
    // "0" signals a non-fungible asset; empty or garbage scales as 18
    #[serde(rename = "tokenDecimal", default)]
    pub token_decimal: String,
}

/// The two raw record shapes, matched exhaustively by the classifier
/// and normalizer.
#[derive(Debug, Clone, Copy)]
pub enum RawRecord<'a> {
    Native(&'a RawTransaction),
    Token(&'a RawTokenTransfer),
}

impl RawRecord<'_> {
    /// Sender and recipient addresses, shape-independent.
    pub fn parties(&self) -> (&str, &str) {
        match self {
            RawRecord::Native(tx) => (&tx.from, &tx.to),
            RawRecord::Token(transfer) => (&transfer.from, &transfer.to),
        }
    }
}

/// Which explorer feed a native record came from; token transfers are their
/// own shape and carry their own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Transaction,
    Internal,
    TokenTransfer,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Transaction => "transaction",
            RecordKind::Internal => "internal",
            RecordKind::TokenTransfer => "token_transfer",
        }
    }
}

/// The unified, chain-agnostic output record.
///
/// Serialized field names are the exact column names the accounting-tool
/// writers expect; `None` becomes an empty CSV cell or a JSON null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalTransaction {
    /// Explorer-native timestamp, passed through verbatim
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Sent Amount")]
    pub sent_amount: Option<String>,

    #[serde(rename = "Sent Currency")]
    pub sent_currency: Option<String>,

    #[serde(rename = "Received Amount")]
    pub received_amount: Option<String>,

    #[serde(rename = "Received Currency")]
    pub received_currency: Option<String>,

    #[serde(rename = "Fee Amount")]
    pub fee_amount: Option<String>,

    #[serde(rename = "Fee Currency")]
    pub fee_currency: Option<String>,

    /// Always empty; no price oracle is integrated
    #[serde(rename = "Net Worth Amount")]
    pub net_worth_amount: Option<String>,

    #[serde(rename = "Net Worth Currency")]
    pub net_worth_currency: Option<String>,

    #[serde(rename = "Label")]
    pub label: Option<String>,

    /// Record kind: "transaction" | "internal" | "token_transfer"
    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "TxHash")]
    pub tx_hash: String,
}

impl CanonicalTransaction {
    /// External column order, for writers that build rows by hand.
    pub const COLUMNS: [&'static str; 12] = [
        "Date",
        "Sent Amount",
        "Sent Currency",
        "Received Amount",
        "Received Currency",
        "Fee Amount",
        "Fee Currency",
        "Net Worth Amount",
        "Net Worth Currency",
        "Label",
        "Description",
        "TxHash",
    ];
}
