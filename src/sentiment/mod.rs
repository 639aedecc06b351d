//! Trade-outcome sentiment for posts.
//!
//! Classification is a priority-ordered cascade. Explicit outcome evidence
//! (phrases and signed amounts) decides first, "still open" phrases second,
//! and a lexicon polarity score settles everything else. A post carrying both
//! positive and negative evidence is handed to the polarity score exactly like
//! a post carrying none.

pub mod rules;
pub mod scorer;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::SentimentConfig;
use crate::error::SentimentError;
use crate::models::{LabeledPost, Post, SentimentLabel};
use crate::sentiment::rules::OutcomeEvidence;
use crate::sentiment::scorer::{PolarityScorer, VaderScorer};

/// Heuristic stages, in priority order. The polarity fallback runs after them
/// and always yields a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ExplicitOutcome,
    OpenPosition,
}

const HEURISTIC_STAGES: [Stage; 2] = [Stage::ExplicitOutcome, Stage::OpenPosition];

impl Stage {
    fn evaluate(self, evidence: &OutcomeEvidence) -> Option<SentimentLabel> {
        match self {
            Stage::ExplicitOutcome => match (evidence.positive, evidence.negative) {
                (true, false) => Some(SentimentLabel::Positive),
                (false, true) => Some(SentimentLabel::Negative),
                _ => None,
            },
            Stage::OpenPosition => evidence.unclear.then_some(SentimentLabel::Unclear),
        }
    }
}

pub struct SentimentClassifier {
    scorer: Arc<dyn PolarityScorer>,
    positive_threshold: f64,
    negative_threshold: f64,
}

impl SentimentClassifier {
    pub fn new(scorer: Arc<dyn PolarityScorer>, config: &SentimentConfig) -> Self {
        Self {
            scorer,
            positive_threshold: config.positive_threshold,
            negative_threshold: config.negative_threshold,
        }
    }

    /// Classifier backed by the VADER lexicon.
    pub fn vader(config: &SentimentConfig) -> Self {
        Self::new(Arc::new(VaderScorer::new()), config)
    }

    pub fn classify(&self, post: &Post) -> Result<SentimentLabel, SentimentError> {
        self.classify_text(&post.text())
    }

    pub fn classify_text(&self, text: &str) -> Result<SentimentLabel, SentimentError> {
        let text = text.to_lowercase();
        let evidence = OutcomeEvidence::gather(&text);

        for stage in HEURISTIC_STAGES {
            if let Some(label) = stage.evaluate(&evidence) {
                debug!(?stage, %label, "Label from heuristic stage");
                return Ok(label);
            }
        }

        let score = self.scorer.compound(&text)?;
        let label = self.label_for_score(score);
        debug!(
            scorer = self.scorer.name(),
            score,
            conflict = evidence.is_conflicting(),
            %label,
            "Label from polarity fallback"
        );
        Ok(label)
    }

    fn label_for_score(&self, score: f64) -> SentimentLabel {
        if score >= self.positive_threshold {
            SentimentLabel::Positive
        } else if score <= self.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Unclear
        }
    }

    /// Label every post, preserving input order.
    pub fn label_all(&self, posts: &[Post]) -> Result<Vec<LabeledPost>, SentimentError> {
        posts
            .iter()
            .map(|post| {
                Ok(LabeledPost {
                    post: post.clone(),
                    sentiment: self.classify(post)?,
                })
            })
            .collect()
    }

    /// Posts whose label satisfies `predicate`, with the label attached.
    pub fn filter_by_label<F>(
        &self,
        posts: &[Post],
        predicate: F,
    ) -> Result<Vec<LabeledPost>, SentimentError>
    where
        F: Fn(SentimentLabel) -> bool,
    {
        Ok(self
            .label_all(posts)?
            .into_iter()
            .filter(|labeled| predicate(labeled.sentiment))
            .collect())
    }

    #[instrument(skip_all, fields(posts = posts.len()))]
    pub fn label_distribution(&self, posts: &[Post]) -> Result<LabelDistribution, SentimentError> {
        let mut distribution = LabelDistribution::default();
        for post in posts {
            distribution.record(self.classify(post)?);
        }
        Ok(distribution)
    }
}

/// Count of posts per label. Always sums to the number of posts labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelDistribution {
    pub positive: usize,
    pub negative: usize,
    pub unclear: usize,
}

impl LabelDistribution {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Unclear => self.unclear += 1,
        }
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Unclear => self.unclear,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.unclear
    }
}

impl FromIterator<SentimentLabel> for LabelDistribution {
    fn from_iter<I: IntoIterator<Item = SentimentLabel>>(iter: I) -> Self {
        let mut distribution = Self::default();
        for label in iter {
            distribution.record(label);
        }
        distribution
    }
}

/// Which labels count as a bullish signal for screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentFilter {
    pub include_unclear: bool,
}

impl SentimentFilter {
    pub fn accepts(&self, label: SentimentLabel) -> bool {
        match label {
            SentimentLabel::Positive => true,
            SentimentLabel::Unclear => self.include_unclear,
            SentimentLabel::Negative => false,
        }
    }
}
