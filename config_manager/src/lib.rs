use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Explorer HTTP client settings
    pub explorer: ExplorerSettings,

    /// Batch processing settings
    pub batch: BatchSettings,

    /// Per-chain explorer endpoints and reference address sets
    pub chains: BTreeMap<String, ChainSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerSettings {
    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Records requested per page (`offset` query parameter)
    pub page_size: u32,

    /// Total request attempts before a feed degrades to an empty result
    pub max_attempts: u32,

    /// Exponential backoff floor in seconds
    pub backoff_min_seconds: u64,

    /// Exponential backoff ceiling in seconds
    pub backoff_max_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Maximum number of wallets processed concurrently
    pub max_concurrent_wallets: usize,

    /// Directory output files are written to
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Explorer API base URL (Etherscan-family `?module=account&action=...`)
    pub base_url: String,

    /// Environment variable holding this chain's API key; None means the
    /// endpoint takes no key
    pub api_key_env: Option<String>,

    /// Native currency symbol (18 decimals assumed)
    pub native_currency: String,

    /// Known DeFi router addresses, lowercase
    pub defi_routers: HashSet<String>,

    /// Known bridge contract addresses, lowercase
    pub bridge_contracts: HashSet<String>,
}

impl ChainSettings {
    /// Resolve the API key from the configured environment variable, if any.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }
}

fn address_set(addresses: &[&str]) -> HashSet<String> {
    addresses.iter().map(|a| a.to_lowercase()).collect()
}

fn etherscan_chain(
    base_url: &str,
    api_key_env: Option<&str>,
    native_currency: &str,
    defi_routers: &[&str],
    bridge_contracts: &[&str],
) -> ChainSettings {
    ChainSettings {
        base_url: base_url.to_string(),
        api_key_env: api_key_env.map(str::to_string),
        native_currency: native_currency.to_string(),
        defi_routers: address_set(defi_routers),
        bridge_contracts: address_set(bridge_contracts),
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut chains = BTreeMap::new();

        chains.insert(
            "mintchain".to_string(),
            etherscan_chain(
                "https://api.routescan.io/v2/network/mainnet/evm/185/etherscan",
                None,
                "ETH",
                &[],
                // OP-stack L2 standard bridge predeploy
                &["0x4200000000000000000000000000000000000010"],
            ),
        );
        chains.insert(
            "etherscan".to_string(),
            etherscan_chain(
                "https://api.etherscan.io/api",
                Some("ETHERSCAN_API_KEY"),
                "ETH",
                &[
                    // Uniswap V2 Router 2
                    "0x7a250d5630b4cf539739df2c5dacb4c659f2488d",
                    // Uniswap V3 Router
                    "0xe592427a0aece92de3edee1f18e0157c05861564",
                    // Uniswap V3 Router 2
                    "0x68b3465833fb72a70ecdf485e0e4c7bd8660fc45",
                    // SushiSwap Router
                    "0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f",
                ],
                &[
                    // Arbitrum One bridge
                    "0x8315177ab297ba92a06054ce80a67ed4dbd7ed3a",
                    // Polygon PoS (ERC20 predicate)
                    "0xa0c68c638235ee32657e8f720a23cec1bfc77c77",
                    // Optimism gateway
                    "0x99c9fc46f92e8a1c0dec1b1747d010903e884be1",
                    // Base bridge
                    "0x3154cf16ccdb4c6d922629664174b904d80f2c35",
                ],
            ),
        );
        chains.insert(
            "basescan".to_string(),
            etherscan_chain(
                "https://api.basescan.org/api",
                Some("BASESCAN_API_KEY"),
                "ETH",
                &[
                    // Uniswap V3 Router (Base)
                    "0x2626664c2603336e57b271c5c0b26d2464912bb4",
                    // BaseSwap Router
                    "0xbe2133400b95767b347b4d3cca1b576871de388b",
                ],
                &["0x4200000000000000000000000000000000000010"],
            ),
        );
        chains.insert(
            "arbiscan".to_string(),
            etherscan_chain(
                "https://api.arbiscan.io/api",
                Some("ARBISCAN_API_KEY"),
                "ETH",
                &[
                    // SushiSwap (Arbitrum)
                    "0x1b02da8cb0d097eb8d57a175b88c7d8b47997506",
                ],
                &[
                    // Arbitrum L2 gateway router
                    "0x5288c571fd7ad117bea99bf60fe0846c4e84f933",
                ],
            ),
        );
        chains.insert(
            "optimism".to_string(),
            etherscan_chain(
                "https://api-optimistic.etherscan.io/api",
                Some("OPTIMISM_API_KEY"),
                "ETH",
                &[],
                &["0x4200000000000000000000000000000000000010"],
            ),
        );
        chains.insert(
            "polygon".to_string(),
            etherscan_chain(
                "https://api.polygonscan.com/api",
                Some("POLYGON_API_KEY"),
                "MATIC",
                &[],
                &[],
            ),
        );

        Self {
            explorer: ExplorerSettings {
                request_timeout_seconds: 10,
                page_size: 10_000,
                max_attempts: 5,
                backoff_min_seconds: 4,
                backoff_max_seconds: 60,
            },
            batch: BatchSettings {
                max_concurrent_wallets: 5,
                output_dir: "output".to_string(),
            },
            chains,
        }
    }
}

impl SystemConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        // Add config file if it exists
        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        // Add environment variables with prefix
        config_builder = config_builder.add_source(
            Environment::with_prefix("EXPORTER")
                .try_parsing(true)
                .separator("__"),
        );

        let config = config_builder.build()?;
        let system_config: SystemConfig = config.try_deserialize()?;

        system_config.validate()?;

        Ok(system_config)
    }

    /// Look up a chain's settings.
    ///
    /// This is the one hard failure in the fetch path: asking for a chain
    /// that is not configured is operator error, not a transient condition.
    pub fn chain(&self, chain_id: &str) -> Result<&ChainSettings> {
        self.chains
            .get(chain_id)
            .ok_or_else(|| ConfigurationError::UnsupportedChain(chain_id.to_string()))
    }

    /// Chain identifiers known to this configuration.
    pub fn chain_ids(&self) -> Vec<String> {
        self.chains.keys().cloned().collect()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.explorer.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.explorer.page_size == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Page size must be greater than 0".to_string(),
            ));
        }

        if self.explorer.max_attempts == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Max attempts must be greater than 0".to_string(),
            ));
        }

        if self.batch.max_concurrent_wallets == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Batch concurrency must be greater than 0".to_string(),
            ));
        }

        if self.chains.is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "At least one chain must be configured".to_string(),
            ));
        }

        for (chain_id, chain) in &self.chains {
            if chain.base_url.is_empty() {
                return Err(ConfigurationError::InvalidValue(format!(
                    "Chain '{}' has an empty base URL",
                    chain_id
                )));
            }
        }

        Ok(())
    }
}
