//! Lexicon-based polarity scoring used when explicit outcome evidence is
//! missing or contradictory.

use once_cell::sync::OnceCell;
use tracing::debug;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::error::SentimentError;

/// A general-purpose polarity model producing a compound score in [-1, 1].
pub trait PolarityScorer: Send + Sync {
    fn compound(&self, text: &str) -> Result<f64, SentimentError>;

    fn name(&self) -> &str;
}

/// VADER scorer. The lexicon is parsed on first use and reused afterwards.
#[derive(Default)]
pub struct VaderScorer {
    analyzer: OnceCell<SentimentIntensityAnalyzer<'static>>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self::default()
    }

    fn analyzer(&self) -> &SentimentIntensityAnalyzer<'static> {
        self.analyzer.get_or_init(|| {
            debug!("Loading VADER lexicon");
            SentimentIntensityAnalyzer::new()
        })
    }
}

impl PolarityScorer for VaderScorer {
    fn compound(&self, text: &str) -> Result<f64, SentimentError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }

        let scores = self.analyzer().polarity_scores(text);
        let compound = scores
            .get("compound")
            .copied()
            .ok_or_else(|| SentimentError::Scorer("VADER returned no compound score".to_string()))?;

        if !compound.is_finite() {
            return Err(SentimentError::Scorer(format!(
                "VADER returned non-finite compound score: {compound}"
            )));
        }

        Ok(compound.clamp(-1.0, 1.0))
    }

    fn name(&self) -> &str {
        "vader"
    }
}
