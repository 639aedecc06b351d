use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A social-media post handed in by the ingestion layer.
///
/// Only `title` and `body` drive classification and extraction. Missing text
/// fields deserialize as empty strings so a sparse record never aborts a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "selftext", alias = "content")]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Post {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Title and body joined into the single string every analyser works on.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Unclear,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Unclear => write!(f, "unclear"),
        }
    }
}

/// A post together with the label the classifier gave it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledPost {
    #[serde(flatten)]
    pub post: Post,
    pub sentiment: SentimentLabel,
}
