//! Keyword and pattern tables for trade-outcome detection.
//!
//! All matching runs on lower-cased text and is substring based: no
//! tokenization, no stemming.

use once_cell::sync::Lazy;
use regex::Regex;

const POSITIVE_PHRASES: &[&str] = &[
    "closed for profit",
    "closed for a profit",
    "closed at a profit",
    "took profit",
    "taking profit",
    "took profits",
    "realized profit",
    "realized gain",
    "credit received",
    "rolled for credit",
    "rolled for a credit",
    "collected premium",
    "premium collected",
    "expired worthless",
    "max profit",
    "made money",
    "in the green",
];

const NEGATIVE_PHRASES: &[&str] = &[
    "closed for loss",
    "closed for a loss",
    "closed at a loss",
    "realized loss",
    "took a loss",
    "taking a loss",
    "blew up",
    "debit to roll",
    "rolled for debit",
    "rolled for a debit",
    "stopped out",
    "lost money",
    "max loss",
    "in the red",
    "bag holding",
    "bagholding",
];

const UNCLEAR_PHRASES: &[&str] = &[
    "rolled",
    "rolling",
    "still holding",
    "still open",
    "still in the trade",
    "position is open",
    "monitoring",
    "watching",
    "continuing to hold",
    "holding through",
    "waiting for",
    "wait and see",
];

static POSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // +$500, +$1,250.50
        r"(?:^|[^\w$])\+\$\d",
        // +25%, +3.5%
        r"(?:^|[^\w$])\+\d+(?:\.\d+)?%",
        // p/l +500, pl: +$20
        r"\bp/?l:?\s*\+\$?\d",
        // made $400, profit of +$200, gained 12%
        r"\b(?:profit|made|gained)(?:\s+(?:of|about|around|roughly))?\s+(?:\+?\$\d|\+?\d+(?:\.\d+)?%)",
    ])
});

static NEGATIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:^|[^\w$])-\$\d",
        r"(?:^|[^\w$])-\d+(?:\.\d+)?%",
        r"\bp/?l:?\s*-\$?\d",
        // lost $300, down 20%, loss of -$800
        r"\b(?:loss|lost|down)(?:\s+(?:of|about|around|roughly|by))?\s+(?:-?\$\d|-?\d+(?:\.\d+)?%)",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("outcome pattern must compile"))
        .collect()
}

/// Which kinds of explicit evidence a lower-cased analysis string carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeEvidence {
    pub positive: bool,
    pub negative: bool,
    pub unclear: bool,
}

impl OutcomeEvidence {
    pub fn gather(text: &str) -> Self {
        Self {
            positive: has_positive_outcome(text),
            negative: has_negative_outcome(text),
            unclear: has_unclear_outcome(text),
        }
    }

    pub fn is_conflicting(&self) -> bool {
        self.positive && self.negative
    }
}

pub fn has_positive_outcome(text: &str) -> bool {
    contains_any(text, POSITIVE_PHRASES) || matches_any(text, &POSITIVE_PATTERNS)
}

pub fn has_negative_outcome(text: &str) -> bool {
    contains_any(text, NEGATIVE_PHRASES) || matches_any(text, &NEGATIVE_PATTERNS)
}

pub fn has_unclear_outcome(text: &str) -> bool {
    contains_any(text, UNCLEAR_PHRASES)
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

fn matches_any(text: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}
