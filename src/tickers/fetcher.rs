use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::SymbolSourceConfig;
use crate::error::SymbolError;

/// Downloads the raw text of one symbol-master feed.
#[async_trait]
pub trait SymbolFetcher: Send + Sync {
    async fn fetch(&self, source: &SymbolSourceConfig) -> Result<String, SymbolError>;
}

/// Plain HTTPS fetcher for the NASDAQ Trader symbol directory.
pub struct HttpSymbolFetcher {
    client: reqwest::Client,
}

impl HttpSymbolFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("thetagang-wheel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SymbolFetcher for HttpSymbolFetcher {
    #[instrument(skip(self), fields(source = %source.name))]
    async fn fetch(&self, source: &SymbolSourceConfig) -> Result<String, SymbolError> {
        let fetch_error = |message: String| SymbolError::Fetch {
            name: source.name.clone(),
            url: source.url.clone(),
            message,
        };

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| fetch_error(e.to_string()))?;

        info!(bytes = body.len(), "Symbol master downloaded");
        Ok(body)
    }
}
