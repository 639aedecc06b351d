use std::path::PathBuf;

use thiserror::Error;

/// Failures of the symbol allow-list cache. Both variants mean the allow-list
/// is unavailable; neither is retried internally.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("failed to fetch symbol master '{name}' from {url}: {message}")]
    Fetch {
        name: String,
        url: String,
        message: String,
    },

    #[error("symbol cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("polarity scorer unavailable: {0}")]
    Scorer(String),
}

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error(transparent)]
    Symbols(#[from] SymbolError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    #[error("option chain source error: {0}")]
    ChainSource(String),
}

/// Why a symbol-master file was rejected. The file then contributes no symbols.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolParseError {
    #[error("symbol master is empty")]
    Empty,

    #[error("symbol master is not valid UTF-8")]
    NotUtf8,

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: &'static str },
}
