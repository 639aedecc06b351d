//! Candidate ticker extraction from free text.
//!
//! Two independent patterns feed a union, the stop-list is subtracted, and the
//! allow-list intersection happens last. Each step is a separate function.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::tickers::symbols::SymbolAllowList;

static CASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z]{1,5})\b").expect("cashtag pattern must compile"));

static BARE_CAPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("all-caps pattern must compile"));

/// Uppercase words that look like tickers but almost never are.
const STOP_WORDS: &[&str] = &[
    // Single letters
    "A", "I",
    // Common English
    "ALL", "ALSO", "AM", "AN", "AND", "ANY", "ARE", "AS", "AT", "BACK", "BE", "BEEN", "BEST",
    "BIG", "BUT", "BY", "CAN", "DAY", "DID", "DO", "DONE", "EVEN", "EVERY", "FOR", "FROM",
    "GET", "GO", "GOOD", "GOT", "GREAT", "HAD", "HAS", "HAVE", "HE", "HER", "HERE", "HIGH",
    "HIM", "HIS", "HOW", "IF", "IN", "INTO", "IS", "IT", "ITS", "JUST", "KNOW", "LAST", "LIKE",
    "LONG", "LOOK", "LOW", "MADE", "MAKE", "MANY", "ME", "MORE", "MOST", "MUCH", "MUST", "MY",
    "NEED", "NEVER", "NEW", "NEXT", "NO", "NOT", "NOW", "OF", "OFF", "OLD", "ON", "ONCE", "ONE",
    "ONLY", "OR", "OUR", "OUT", "OVER", "OWN", "PLAY", "REAL", "RIGHT", "SAME", "SAY", "SEE",
    "SHORT", "SO", "SOME", "STILL", "SURE", "TAKE", "THAN", "THANK", "THAT", "THE", "THEIR",
    "THEM", "THEN", "THERE", "THESE", "THEY", "THINK", "THIS", "TIME", "TO", "TODAY", "TOO",
    "TWO", "UP", "US", "VERY", "WANT", "WAS", "WAY", "WE", "WEEK", "WELL", "WENT", "WERE",
    "WHAT", "WHEN", "WHERE", "WHICH", "WHILE", "WHO", "WHY", "WILL", "WIN", "WITH", "WORK",
    "WOULD", "YEAR", "YES", "YET", "YOU", "YOUR",
    // Trading jargon and abbreviations
    "ATH", "ATL", "ATM", "BTC", "BTO", "BUY", "CALL", "CALLS", "CASH", "CC", "CCS", "CEO",
    "CFO", "CPI", "CSP", "CSPS", "DCA", "DD", "DTE", "EOD", "EOW", "EPS", "ETF", "ETFS", "FA",
    "FED", "GAIN", "GDP", "HOLD", "IPO", "IRA", "ITM", "IV", "IVR", "LEAP", "LEAPS", "LOSS",
    "MONEY", "NYSE", "OI", "OTM", "PCS", "PE", "PL", "PNL", "PUT", "PUTS", "RH", "ROI", "ROLL",
    "SELL", "SEC", "SL", "STC", "STO", "TA", "TP", "USD", "WHEEL",
    // Internet slang
    "APE", "APES", "BTW", "DM", "EDIT", "FML", "FOMO", "FUD", "FYI", "GG", "GUH", "HODL", "IDK",
    "IMHO", "IMO", "LMAO", "LOL", "MOON", "NGL", "OK", "OMG", "RIP", "SMH", "TBH", "TLDR",
    "WSB", "WTF", "YOLO",
];

static STOP_LIST: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// `$tsla`, `$TSLA` and `$Tsla` all yield `TSLA`.
pub fn cashtag_candidates(text: &str) -> BTreeSet<String> {
    CASHTAG
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
        .collect()
}

/// Standalone words of one to five uppercase letters.
pub fn bare_candidates(text: &str) -> BTreeSet<String> {
    BARE_CAPS
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Exact, case-sensitive membership in the uppercase stop-list.
pub fn is_stop_word(candidate: &str) -> bool {
    STOP_LIST.contains(candidate)
}

/// Union of both patterns minus the stop-list.
pub fn extract_candidates(text: &str) -> BTreeSet<String> {
    let mut candidates = cashtag_candidates(text);
    candidates.extend(bare_candidates(text));
    candidates.retain(|c| !is_stop_word(c));
    candidates
}

/// Candidates that are also listed symbols.
pub fn validated_tickers(text: &str, allow_list: &SymbolAllowList) -> BTreeSet<String> {
    extract_candidates(text)
        .into_iter()
        .filter(|c| allow_list.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cashtags_are_case_insensitive() {
        let tickers = cashtag_candidates("bought $aapl and $Tsla, sold $MSFT");
        assert_eq!(
            tickers.into_iter().collect::<Vec<_>>(),
            vec!["AAPL", "MSFT", "TSLA"]
        );
    }

    #[test]
    fn test_bare_caps_only_match_uppercase() {
        let tickers = bare_candidates("My NVDA position is doing well, also holding SPY and nvda");
        assert!(tickers.contains("NVDA"));
        assert!(tickers.contains("SPY"));
        assert!(!tickers.contains("My"));
        assert_eq!(tickers.len(), 2);
    }

    #[test]
    fn test_mixed_extraction() {
        let tickers = extract_candidates("Sold $MSFT calls and bought GOOGL puts");
        assert!(tickers.contains("MSFT"));
        assert!(tickers.contains("GOOGL"));
    }

    #[test]
    fn test_stop_words_excluded() {
        let tickers = extract_candidates("I PUT my money in THE market for A good GAIN, YOLO");
        for word in ["PUT", "THE", "A", "I", "GAIN", "YOLO"] {
            assert!(!tickers.contains(word), "{word} should be stop-listed");
        }
        assert!(tickers.is_empty());
    }

    #[test]
    fn test_stop_list_applies_to_cashtags() {
        let tickers = extract_candidates("$the $put $CALL");
        assert!(tickers.is_empty());
    }

    #[test]
    fn test_length_limits() {
        let tickers = extract_candidates("I have $F $AAPL $ABCDE $ABCDEF and IBM APPLE GOOGL ABCDEF");
        assert!(tickers.contains("F"));
        assert!(tickers.contains("AAPL"));
        assert!(tickers.contains("ABCDE"));
        assert!(tickers.contains("IBM"));
        assert!(tickers.contains("APPLE"));
        assert!(tickers.contains("GOOGL"));
        assert!(!tickers.contains("ABCDEF"));
    }

    #[test]
    fn test_strike_suffixes_and_underscores_ignored() {
        let tickers = bare_candidates("sold the 220P and INVALID_TICKER puts");
        assert!(tickers.is_empty());
    }

    #[test]
    fn test_real_world_example() {
        let text = "Closed my $TSLA 220P for +$500 profit! \
                    Also rolled my AAPL position and bought SPY puts. \
                    THE market is volatile but I MADE good money.";
        let tickers = extract_candidates(text);
        assert!(tickers.contains("TSLA"));
        assert!(tickers.contains("AAPL"));
        assert!(tickers.contains("SPY"));
        assert!(!tickers.contains("THE"));
        assert!(!tickers.contains("MADE"));
    }

    #[test]
    fn test_validated_tickers_intersects_allow_list() {
        let allow_list: SymbolAllowList = ["AAPL", "TSLA", "SPY"].into_iter().collect();
        let text = "Closed my $TSLA 220P for +$500 profit! Also rolled my AAPL position \
                    and bought SPY puts. THE market is volatile but I MADE good money. ZZZZ";
        let tickers = validated_tickers(text, &allow_list);
        assert_eq!(
            tickers.into_iter().collect::<Vec<_>>(),
            vec!["AAPL", "SPY", "TSLA"]
        );
    }

    #[test]
    fn test_stop_word_never_survives_even_if_listed() {
        let allow_list: SymbolAllowList = ["THE", "PUT", "YOLO", "ALL"].into_iter().collect();
        let tickers = validated_tickers("THE PUT was ALL YOLO $the", &allow_list);
        assert!(tickers.is_empty());
    }
}
