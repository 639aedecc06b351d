//! End-to-end screening: posts in, ranked put candidates out.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::calendar::next_expiration;
use crate::clock::Clock;
use crate::config::ScreeningConfig;
use crate::error::ScreeningError;
use crate::models::Post;
use crate::screening::chains::OptionChainSource;
use crate::screening::filters::{apply_safety_filters, rank_by_yield};
use crate::screening::models::{OptionCandidate, ScreeningResult};
use crate::sentiment::{LabelDistribution, SentimentClassifier, SentimentFilter};
use crate::tickers::count_mentions;
use crate::tickers::symbols::SymbolCache;

pub struct ScreeningPipeline {
    classifier: SentimentClassifier,
    symbols: Arc<SymbolCache>,
    chains: Arc<dyn OptionChainSource>,
    config: ScreeningConfig,
    clock: Arc<dyn Clock>,
}

impl ScreeningPipeline {
    pub fn new(
        classifier: SentimentClassifier,
        symbols: Arc<SymbolCache>,
        chains: Arc<dyn OptionChainSource>,
        config: ScreeningConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            classifier,
            symbols,
            chains,
            config,
            clock,
        }
    }

    /// Run one screening pass over a batch of posts.
    ///
    /// The sentiment distribution covers every post; mentions are counted only
    /// over posts the sentiment filter keeps. A ticker whose chain cannot be
    /// fetched is skipped.
    #[instrument(skip_all, fields(posts = posts.len()))]
    pub async fn run(&self, posts: &[Post]) -> Result<ScreeningResult, ScreeningError> {
        let labeled = self.classifier.label_all(posts)?;
        let sentiment: LabelDistribution = labeled.iter().map(|l| l.sentiment).collect();

        let filter = SentimentFilter {
            include_unclear: self.config.include_unclear_sentiment,
        };
        let kept: Vec<Post> = labeled
            .into_iter()
            .filter(|l| filter.accepts(l.sentiment))
            .map(|l| l.post)
            .collect();
        info!(
            positive = sentiment.positive,
            negative = sentiment.negative,
            unclear = sentiment.unclear,
            kept = kept.len(),
            "Posts classified"
        );

        let allow_list = self.symbols.allow_list().await?;
        let mentions =
            count_mentions(&kept, &allow_list).filter_by_min_mentions(self.config.min_mentions);
        let tickers: Vec<String> = mentions
            .top_n(self.config.max_tickers)
            .into_iter()
            .map(|(ticker, _)| ticker)
            .collect();

        let expiration = next_expiration(self.clock.now());
        info!(tickers = ?tickers, %expiration, "Screening tickers");

        let mut puts: Vec<OptionCandidate> = Vec::new();
        for ticker in &tickers {
            match self.chains.fetch_puts(ticker, expiration).await {
                Ok(chain) => puts.extend(chain),
                Err(e) => {
                    warn!(
                        ticker = %ticker,
                        source = self.chains.name(),
                        error = %e,
                        "Failed to get option chain, skipping"
                    );
                }
            }
        }

        let quoted = puts.len();
        let mut candidates = apply_safety_filters(puts, &self.config);
        rank_by_yield(&mut candidates);
        info!(quoted, passed = candidates.len(), "Candidates after safety filters");

        Ok(ScreeningResult {
            timestamp: self.clock.now(),
            posts_analyzed: posts.len(),
            sentiment,
            mentions,
            tickers_screened: tickers,
            expiration,
            candidates,
        })
    }
}
