use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::error::ScreeningError;
use crate::screening::models::OptionCandidate;

/// Supplies put quotes for one underlying and expiration.
#[async_trait]
pub trait OptionChainSource: Send + Sync {
    async fn fetch_puts(
        &self,
        ticker: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionCandidate>, ScreeningError>;

    fn name(&self) -> &str;
}

/// Chains exported to a JSON file: an object of ticker -> list of puts.
///
/// ```json
/// { "AAPL": [{ "ticker": "AAPL", "strike": "50", "bid": "0.45", ... }] }
/// ```
pub struct JsonChainSource {
    chains: HashMap<String, Vec<OptionCandidate>>,
}

impl JsonChainSource {
    pub fn from_json(contents: &str) -> Result<Self, ScreeningError> {
        let chains: HashMap<String, Vec<OptionCandidate>> = serde_json::from_str(contents)
            .map_err(|e| ScreeningError::ChainSource(format!("invalid chain JSON: {e}")))?;
        Ok(Self { chains })
    }

    #[instrument]
    pub async fn load(path: &Path) -> Result<Self, ScreeningError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ScreeningError::ChainSource(format!("cannot read {}: {e}", path.display()))
        })?;
        let source = Self::from_json(&contents)?;
        info!(tickers = source.chains.len(), "Option chains loaded");
        Ok(source)
    }
}

#[async_trait]
impl OptionChainSource for JsonChainSource {
    async fn fetch_puts(
        &self,
        ticker: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionCandidate>, ScreeningError> {
        let chain = self
            .chains
            .get(ticker)
            .ok_or_else(|| ScreeningError::ChainSource(format!("no chain for {ticker}")))?;

        Ok(chain
            .iter()
            .filter(|c| c.expiration == expiration)
            .cloned()
            .map(|mut c| {
                c.ticker = ticker.to_string();
                c
            })
            .collect())
    }

    fn name(&self) -> &str {
        "json"
    }
}
