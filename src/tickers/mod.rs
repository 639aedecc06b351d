//! Ticker mentions across a batch of posts.
//!
//! Counts are post-level presence counts: a symbol mentioned five times in one
//! post adds one to its count.

pub mod extract;
pub mod fetcher;
pub mod symbols;

use std::collections::{BTreeSet, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, instrument};

use crate::error::SymbolError;
use crate::models::Post;
use crate::tickers::extract::validated_tickers;
use crate::tickers::symbols::{SymbolAllowList, SymbolCache};

/// Ticker -> number of distinct posts mentioning it, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionCounts {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl MentionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one post's validated tickers. Duplicates inside the set passed
    /// in count once.
    pub fn record_post(&mut self, tickers: &BTreeSet<String>) {
        for ticker in tickers {
            self.add(ticker, 1);
        }
    }

    fn add(&mut self, ticker: &str, count: usize) {
        match self.index.get(ticker) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.index.insert(ticker.to_string(), self.entries.len());
                self.entries.push((ticker.to_string(), count));
            }
        }
    }

    /// Fold in counts from a disjoint batch of posts.
    pub fn merge(&mut self, other: MentionCounts) {
        for (ticker, count) in other.entries {
            self.add(&ticker, count);
        }
    }

    pub fn get(&self, ticker: &str) -> usize {
        self.index.get(ticker).map_or(0, |&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// The `n` most mentioned tickers, highest first. Ties keep first-seen
    /// order.
    pub fn top_n(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Tickers mentioned in at least `min_mentions` posts.
    pub fn filter_by_min_mentions(&self, min_mentions: usize) -> MentionCounts {
        self.entries
            .iter()
            .filter(|(_, count)| *count >= min_mentions)
            .cloned()
            .collect()
    }
}

impl FromIterator<(String, usize)> for MentionCounts {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (ticker, count) in iter {
            counts.add(&ticker, count);
        }
        counts
    }
}

impl Serialize for MentionCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (ticker, count) in &self.entries {
            map.serialize_entry(ticker, count)?;
        }
        map.end()
    }
}

/// Count validated ticker mentions against an explicit allow-list.
pub fn count_mentions(posts: &[Post], allow_list: &SymbolAllowList) -> MentionCounts {
    let mut counts = MentionCounts::new();
    for post in posts {
        let tickers = validated_tickers(&post.text(), allow_list);
        if !tickers.is_empty() {
            debug!(post = %post.id, ?tickers, "Tickers found");
        }
        counts.record_post(&tickers);
    }
    counts
}

/// Count validated ticker mentions using the cached allow-list.
#[instrument(skip_all, fields(posts = posts.len()))]
pub async fn extract_mentions(
    posts: &[Post],
    cache: &SymbolCache,
) -> Result<MentionCounts, SymbolError> {
    let allow_list = cache.allow_list().await?;
    Ok(count_mentions(posts, &allow_list))
}
