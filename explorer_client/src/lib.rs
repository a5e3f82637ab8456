use config_manager::{ChainSettings, ExplorerSettings, SystemConfig};
use ledger_core::{RawTokenTransfer, RawTransaction};
use reqwest::{Client, StatusCode};
use retry_utils::{retry_with_backoff, RetryPolicy, RetryableError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Message Etherscan-family APIs use to signal an empty (but valid) result.
const NO_RECORDS_MESSAGE: &str = "No transactions found";

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config_manager::ConfigurationError),
}

/// Transport-level failures that enter the retry loop. Everything else in
/// the fetch path degrades to an empty result instead of erroring.
#[derive(Error, Debug)]
enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(StatusCode),
    #[error("rate limited (Retry-After: {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },
}

impl FetchError {
    fn retryable(&self) -> RetryableError {
        match self {
            FetchError::RateLimited { retry_after } => RetryableError::RateLimit {
                retry_after: *retry_after,
            },
            _ => RetryableError::Transport,
        }
    }
}

/// Etherscan-family response envelope. `result` is an array of records on
/// success and a bare string on API-level errors.
#[derive(Debug, Deserialize)]
struct ExplorerEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

/// Client for one chain's explorer API: paginated account-activity fetches
/// with retry/backoff, rate-limit waits and per-record validation.
///
/// Fetch methods never fail: a feed that cannot be retrieved after retries
/// contributes zero records. The one hard error is asking for a chain the
/// configuration does not know, at construction time.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    chain_id: String,
    chain: ChainSettings,
    page_size: u32,
    policy: RetryPolicy,
}

/// Map explorer backoff settings onto a retry policy.
pub fn retry_policy(settings: &ExplorerSettings) -> RetryPolicy {
    RetryPolicy {
        max_attempts: settings.max_attempts,
        multiplier_secs: 1,
        min_delay: Duration::from_secs(settings.backoff_min_seconds),
        max_delay: Duration::from_secs(settings.backoff_max_seconds),
    }
}

impl ExplorerClient {
    pub fn new(chain_id: &str, config: &SystemConfig) -> Result<Self, ExplorerError> {
        let chain = config.chain(chain_id)?.clone();
        let policy = retry_policy(&config.explorer);
        Self::from_parts(chain_id, chain, &config.explorer, policy)
    }

    /// Assemble a client from explicit parts; lets tests point the base URL
    /// at a local mock server and shorten the backoff schedule.
    pub fn from_parts(
        chain_id: &str,
        chain: ChainSettings,
        settings: &ExplorerSettings,
        policy: RetryPolicy,
    ) -> Result<Self, ExplorerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            chain_id: chain_id.to_string(),
            chain,
            page_size: settings.page_size,
            policy,
        })
    }

    pub fn chain(&self) -> &ChainSettings {
        &self.chain
    }

    /// All normal transactions for a wallet, oldest first.
    pub async fn get_transactions(&self, wallet_address: &str) -> Vec<RawTransaction> {
        self.fetch_all_pages("txlist", wallet_address).await
    }

    /// All ERC-20/721 token transfers for a wallet, oldest first.
    pub async fn get_token_transfers(&self, wallet_address: &str) -> Vec<RawTokenTransfer> {
        self.fetch_all_pages("tokentx", wallet_address).await
    }

    /// All internal (message-call) transactions for a wallet, oldest first.
    pub async fn get_internal_transactions(&self, wallet_address: &str) -> Vec<RawTransaction> {
        self.fetch_all_pages("txlistinternal", wallet_address).await
    }

    /// Walk successive result pages until a short page signals exhaustion.
    /// An exact page-size multiple costs one extra short page; a failed page
    /// (empty after retries) terminates pagination at that point.
    async fn fetch_all_pages<T: DeserializeOwned>(&self, action: &str, wallet: &str) -> Vec<T> {
        let mut all_records = Vec::new();
        let mut page = 1u32;

        loop {
            let params = self.build_params(action, wallet, page);
            let batch = self.fetch::<T>(action, &params).await;
            let count = batch.len();
            all_records.extend(batch);

            debug!(
                "Page {}: {} {} records for wallet {} on {}",
                page, count, action, wallet, self.chain_id
            );

            if count < self.page_size as usize {
                break;
            }
            page += 1;
        }

        info!(
            "Fetched {} {} records for wallet {} on {} ({} page(s))",
            all_records.len(),
            action,
            wallet,
            self.chain_id,
            page
        );
        all_records
    }

    /// One retried request. Terminal failure logs and yields an empty list;
    /// retries never surface to the pagination loop.
    async fn fetch<T: DeserializeOwned>(&self, action: &str, params: &[(String, String)]) -> Vec<T> {
        let attempt = || self.fetch_page::<T>(action, params);

        match retry_with_backoff(attempt, &self.policy, FetchError::retryable).await {
            Ok(records) => records,
            Err(e) => {
                error!(
                    "Giving up on {} fetch for {} after {} attempts: {}",
                    action, self.chain_id, self.policy.max_attempts, e
                );
                Vec::new()
            }
        }
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>, FetchError> {
        let response = self
            .http
            .get(&self.chain.base_url)
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            warn!(
                "Rate limited by {} explorer (Retry-After: {:?})",
                self.chain_id, retry_after
            );
            return Err(FetchError::RateLimited { retry_after });
        }

        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let envelope: ExplorerEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(
                    "Malformed {} response from {} explorer: {}",
                    action, self.chain_id, e
                );
                return Ok(Vec::new());
            }
        };

        // "No transactions found" is a normal empty outcome, not an error
        if envelope
            .message
            .as_deref()
            .map_or(false, |message| message.starts_with(NO_RECORDS_MESSAGE))
        {
            debug!("No {} records for this wallet on {}", action, self.chain_id);
            return Ok(Vec::new());
        }

        if envelope.status.as_deref() == Some("0") {
            error!(
                "Explorer API error on {} {}: {}",
                self.chain_id,
                action,
                envelope.message.as_deref().unwrap_or("unknown error")
            );
            return Ok(Vec::new());
        }

        let items = match envelope.result {
            Some(serde_json::Value::Array(items)) => items,
            Some(other) => {
                error!(
                    "Explorer 'result' field is not a list on {} {}: {}",
                    self.chain_id, action, other
                );
                return Ok(Vec::new());
            }
            None => {
                error!(
                    "Explorer response missing 'result' field on {} {}",
                    self.chain_id, action
                );
                return Ok(Vec::new());
            }
        };

        // Skip-and-continue: one bad record never poisons its page
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<T>(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "Skipping invalid {} record from {}: {}",
                    action, self.chain_id, e
                ),
            }
        }

        Ok(records)
    }

    /// Etherscan-family query contract; reproduced exactly for
    /// compatibility across the chain table.
    fn build_params(&self, action: &str, wallet: &str, page: u32) -> Vec<(String, String)> {
        let mut params = vec![
            ("module".to_string(), "account".to_string()),
            ("action".to_string(), action.to_string()),
            ("address".to_string(), wallet.to_string()),
            ("startblock".to_string(), "0".to_string()),
            ("endblock".to_string(), "99999999".to_string()),
            ("page".to_string(), page.to_string()),
            ("offset".to_string(), self.page_size.to_string()),
            ("sort".to_string(), "asc".to_string()),
        ];

        if let Some(api_key) = self.chain.api_key() {
            params.push(("apikey".to_string(), api_key));
        }

        params
    }
}
