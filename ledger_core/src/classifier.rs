use crate::RawRecord;
use config_manager::SystemConfig;
use std::collections::{BTreeMap, HashSet};

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const DEAD_ADDRESS: &str = "0x000000000000000000000000000000000000dead";

/// Semantic label assigned to a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Swap,
    Bridge,
    Mint,
    Burn,
    NftTransfer,
    TokenTransfer,
    Transfer,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Swap => "swap",
            Label::Bridge => "bridge",
            Label::Mint => "mint",
            Label::Burn => "burn",
            Label::NftTransfer => "nft_transfer",
            Label::TokenTransfer => "token_transfer",
            Label::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
struct AddressBook {
    routers: HashSet<String>,
    bridges: HashSet<String>,
}

/// Pure, side-effect-free record labeling against per-chain reference
/// address sets. Sets are copied out of the configuration at construction
/// and never mutated; an unknown chain simply has no router/bridge matches.
#[derive(Debug, Clone)]
pub struct Classifier {
    books: BTreeMap<String, AddressBook>,
}

impl Classifier {
    pub fn from_config(config: &SystemConfig) -> Self {
        let books = config
            .chains
            .iter()
            .map(|(chain_id, chain)| {
                (
                    chain_id.clone(),
                    AddressBook {
                        routers: chain.defi_routers.iter().map(|a| a.to_lowercase()).collect(),
                        bridges: chain
                            .bridge_contracts
                            .iter()
                            .map(|a| a.to_lowercase())
                            .collect(),
                    },
                )
            })
            .collect();

        Self { books }
    }

    /// Assign a label, first match wins:
    /// router recipient, bridge party, zero-address mint, zero/dead burn,
    /// then the shape-based fallbacks.
    pub fn classify(&self, record: RawRecord<'_>, chain: &str) -> Label {
        let (from, to) = record.parties();
        let from = from.to_lowercase();
        let to = to.to_lowercase();

        if let Some(book) = self.books.get(chain) {
            if book.routers.contains(&to) {
                return Label::Swap;
            }
            // Deposits into a bridge and claims arriving from one both count
            if book.bridges.contains(&to) || book.bridges.contains(&from) {
                return Label::Bridge;
            }
        }

        if from == ZERO_ADDRESS {
            return Label::Mint;
        }

        if to == ZERO_ADDRESS || to == DEAD_ADDRESS {
            return Label::Burn;
        }

        match record {
            RawRecord::Token(transfer) => {
                if transfer.token_decimal.trim() == "0" {
                    Label::NftTransfer
                } else {
                    Label::TokenTransfer
                }
            }
            RawRecord::Native(_) => Label::Transfer,
        }
    }
}
