use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub screening: ScreeningConfig,
    pub sentiment: SentimentConfig,
    pub symbols: SymbolsConfig,
    pub reddit: RedditConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningConfig {
    /// Account capital; a put is only eligible if `strike * 100` fits in it.
    pub capital: Decimal,
    pub max_strike: Decimal,
    pub min_open_interest: u64,
    pub max_spread_pct: Decimal,
    pub delta_min: Decimal,
    pub delta_max: Decimal,
    pub exclude_earnings: bool,
    pub earnings_blackout_days: u32,
    pub max_tickers: usize,
    pub min_mentions: usize,
    pub include_unclear_sentiment: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentConfig {
    pub positive_threshold: f64,
    pub negative_threshold: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 0.2,
            negative_threshold: -0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolsConfig {
    pub cache_dir: PathBuf,
    pub ttl_hours: i64,
    pub request_timeout_seconds: u64,
    pub sources: Vec<SymbolSourceConfig>,
}

impl SymbolsConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// One symbol-master feed. `name` doubles as the cache file stem.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SymbolSourceConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    pub subreddit: String,
    pub limit: u32,
    pub window_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

/// Secrets loaded exclusively from environment variables.
/// Not serializable, not stored in config files.
pub struct Secrets {
    pub reddit_client_id: Option<String>,
    pub reddit_secret: Option<SecretString>,
    pub reddit_user_agent: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            reddit_client_id: std::env::var("REDDIT_CLIENT_ID").ok(),
            reddit_secret: std::env::var("REDDIT_SECRET").ok().map(SecretString::from),
            reddit_user_agent: std::env::var("REDDIT_USER_AGENT").ok(),
        }
    }

    /// Names of the Reddit variables that are unset or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.reddit_client_id.as_deref().map_or(true, str::is_empty) {
            missing.push("REDDIT_CLIENT_ID");
        }
        if self.reddit_secret.is_none() {
            missing.push("REDDIT_SECRET");
        }
        if self.reddit_user_agent.as_deref().map_or(true, str::is_empty) {
            missing.push("REDDIT_USER_AGENT");
        }
        missing
    }
}

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

impl AppConfig {
    /// Load configuration from a TOML file, overlaying environment variables for secrets.
    pub fn load(path: Option<&Path>) -> Result<(Self, Secrets)> {
        dotenvy::dotenv().ok();

        let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let secrets = Secrets::from_env();

        Ok((config, secrets))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        if config.symbols.sources.is_empty() {
            anyhow::bail!("symbols.sources must list at least one symbol master");
        }
        if config.screening.delta_min > config.screening.delta_max {
            anyhow::bail!(
                "screening.delta_min ({}) exceeds delta_max ({})",
                config.screening.delta_min,
                config.screening.delta_max
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_default_config() {
        let contents = std::fs::read_to_string("config/default.toml")
            .expect("config/default.toml should exist");
        let config = AppConfig::from_toml(&contents).expect("should parse");
        assert_eq!(config.screening.capital, dec!(10000));
        assert_eq!(config.screening.min_open_interest, 200);
        assert!(!config.screening.include_unclear_sentiment);
        assert_eq!(config.symbols.ttl_hours, 24);
        assert_eq!(config.symbols.sources.len(), 2);
        assert_eq!(config.symbols.sources[0].name, "nasdaqlisted");
        assert_eq!(config.reddit.subreddit, "thetagang");
        assert_eq!(config.sentiment.positive_threshold, 0.2);
    }

    #[test]
    fn test_rejects_inverted_delta_range() {
        let contents = std::fs::read_to_string("config/default.toml")
            .expect("config/default.toml should exist")
            .replace("delta_min = \"0.20\"", "delta_min = \"0.50\"");
        assert!(AppConfig::from_toml(&contents).is_err());
    }

    #[test]
    fn test_missing_secrets_reported() {
        let secrets = Secrets {
            reddit_client_id: Some("abc".to_string()),
            reddit_secret: None,
            reddit_user_agent: Some(String::new()),
        };
        assert_eq!(secrets.missing(), vec!["REDDIT_SECRET", "REDDIT_USER_AGENT"]);
    }
}
