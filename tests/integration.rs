//! Integration tests for cross-module functionality.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use thetagang_wheel::calendar::{is_market_holiday, next_expiration};
use thetagang_wheel::config::SentimentConfig;
use thetagang_wheel::error::SentimentError;
use thetagang_wheel::models::{Post, SentimentLabel};
use thetagang_wheel::sentiment::scorer::PolarityScorer;
use thetagang_wheel::sentiment::{SentimentClassifier, SentimentFilter};
use thetagang_wheel::tickers::count_mentions;
use thetagang_wheel::tickers::symbols::SymbolAllowList;
use thetagang_wheel::tickers::MentionCounts;

struct FixedScorer(f64);

impl PolarityScorer for FixedScorer {
    fn compound(&self, _text: &str) -> Result<f64, SentimentError> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn classifier(score: f64) -> SentimentClassifier {
    SentimentClassifier::new(Arc::new(FixedScorer(score)), &SentimentConfig::default())
}

fn allow(symbols: &[&str]) -> SymbolAllowList {
    symbols.iter().copied().collect()
}

// ──────────────────────────────────────────
// Sentiment classification
// ──────────────────────────────────────────

#[test]
fn profit_post_is_positive() {
    let post = Post::new("1", "Closed TSLA puts for profit", "Took profit +$500 on the 220P");
    let label = SentimentClassifier::vader(&SentimentConfig::default())
        .classify(&post)
        .unwrap();
    assert_eq!(label, SentimentLabel::Positive);
}

#[test]
fn blown_up_post_is_negative() {
    let post = Post::new("2", "My trade blew up", "Realized loss -$800 on NVDA puts");
    let label = SentimentClassifier::vader(&SentimentConfig::default())
        .classify(&post)
        .unwrap();
    assert_eq!(label, SentimentLabel::Negative);
}

#[test]
fn open_position_is_unclear() {
    let post = Post::new("3", "Still holding position", "Rolled my puts to next week");
    let label = SentimentClassifier::vader(&SentimentConfig::default())
        .classify(&post)
        .unwrap();
    assert_eq!(label, SentimentLabel::Unclear);
}

#[test]
fn explicit_evidence_beats_polarity() {
    let gain = Post::new("4", "Terrible awful week", "but closed for profit anyway");
    assert_eq!(classifier(-0.9).classify(&gain).unwrap(), SentimentLabel::Positive);

    let loss = Post::new("5", "Amazing wonderful setup", "then stopped out -$200");
    assert_eq!(classifier(0.9).classify(&loss).unwrap(), SentimentLabel::Negative);
}

#[test]
fn conflicting_evidence_is_decided_by_fallback() {
    let post = Post::new(
        "6",
        "Mixed week",
        "Took profit +$300 on AMD, took a loss -$150 on INTC",
    );
    assert_eq!(classifier(0.5).classify(&post).unwrap(), SentimentLabel::Positive);
    assert_eq!(classifier(-0.5).classify(&post).unwrap(), SentimentLabel::Negative);
    assert_eq!(classifier(0.0).classify(&post).unwrap(), SentimentLabel::Unclear);
}

#[test]
fn empty_post_is_unclear() {
    let label = SentimentClassifier::vader(&SentimentConfig::default())
        .classify(&Post::new("7", "", ""))
        .unwrap();
    assert_eq!(label, SentimentLabel::Unclear);
}

#[test]
fn distribution_sums_to_batch_size() {
    let posts = vec![
        Post::new("1", "Closed for profit", ""),
        Post::new("2", "Blew up", ""),
        Post::new("3", "Still open", ""),
        Post::new("4", "", ""),
        Post::new("5", "Made money, took a loss", ""),
    ];
    let distribution = classifier(0.0).label_distribution(&posts).unwrap();
    assert_eq!(distribution.total(), posts.len());
    assert_eq!(distribution.positive, 1);
    assert_eq!(distribution.negative, 1);
    assert_eq!(distribution.unclear, 3);
}

#[test]
fn filter_keeps_bullish_posts() {
    let posts = vec![
        Post::new("1", "Closed for profit", ""),
        Post::new("2", "Blew up", ""),
        Post::new("3", "Still open", ""),
    ];
    let filter = SentimentFilter { include_unclear: true };
    let kept = classifier(0.0)
        .filter_by_label(&posts, |label| filter.accepts(label))
        .unwrap();
    let ids: Vec<&str> = kept.iter().map(|l| l.post.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

// ──────────────────────────────────────────
// Ticker mentions
// ──────────────────────────────────────────

#[test]
fn example_text_counts_three_tickers() {
    let posts = vec![Post::new(
        "1",
        "Closed my $TSLA 220P for +$500 profit! Also rolled my AAPL position and bought SPY puts.",
        "THE market is volatile but I MADE good money.",
    )];
    let mentions = count_mentions(&posts, &allow(&["AAPL", "TSLA", "SPY"]));

    let counts: Vec<(&str, usize)> = mentions.iter().collect();
    assert_eq!(counts.len(), 3);
    assert_eq!(mentions.get("TSLA"), 1);
    assert_eq!(mentions.get("AAPL"), 1);
    assert_eq!(mentions.get("SPY"), 1);
}

#[test]
fn stop_words_never_counted_even_if_listed() {
    let posts = vec![Post::new("1", "THE PUT was a YOLO", "$THE $put $yolo A I DTE ITM")];
    let mentions = count_mentions(
        &posts,
        &allow(&["THE", "PUT", "YOLO", "A", "I", "DTE", "ITM"]),
    );
    assert!(mentions.is_empty());
}

#[test]
fn one_count_per_post() {
    let posts = vec![
        Post::new("1", "$NVDA NVDA $nvda", "NVDA NVDA"),
        Post::new("2", "nvda is lowercase", "no caps here"),
        Post::new("3", "", "$NVDA"),
    ];
    let mentions = count_mentions(&posts, &allow(&["NVDA"]));
    assert_eq!(mentions.get("NVDA"), 2);
}

#[test]
fn top_n_example() {
    let mentions: MentionCounts = [("AAPL", 5), ("TSLA", 3), ("MSFT", 1), ("GOOGL", 4), ("SPY", 2)]
        .into_iter()
        .map(|(t, c)| (t.to_string(), c))
        .collect();
    assert_eq!(
        mentions.top_n(3),
        vec![
            ("AAPL".to_string(), 5),
            ("GOOGL".to_string(), 4),
            ("TSLA".to_string(), 3)
        ]
    );
}

// ──────────────────────────────────────────
// Market calendar
// ──────────────────────────────────────────

#[test]
fn thanksgiving_week_expiration() {
    assert!(is_market_holiday(NaiveDate::from_ymd_opt(2025, 11, 27).unwrap()));
    // Friday after Thanksgiving is a half day, still an expiration
    let monday = Utc.with_ymd_and_hms(2025, 11, 24, 15, 0, 0).unwrap();
    assert_eq!(
        next_expiration(monday),
        NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
    );
}
