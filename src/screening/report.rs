//! Human-readable and CSV renderings of a screening run.

use std::fmt;

use rust_decimal::Decimal;

use crate::screening::filters::total_collateral;
use crate::screening::models::{OptionCandidate, ScreeningResult};

const CSV_HEADER: &str =
    "ticker,expiration,strike,bid,ask,mid,weekly_yield_pct,spread_pct,delta,open_interest,collateral";

/// One line per candidate, ranked order, header first.
pub fn candidates_to_csv(candidates: &[OptionCandidate]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for c in candidates {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            c.ticker,
            c.expiration,
            c.strike,
            c.bid,
            c.ask,
            c.mid,
            c.weekly_yield_pct().round_dp(3).normalize(),
            c.bid_ask_spread_pct()
                .map(|s| s.round_dp(2).normalize().to_string())
                .unwrap_or_default(),
            c.delta.map(|d| d.to_string()).unwrap_or_default(),
            c.open_interest,
            c.collateral(),
        ));
    }
    out
}

impl fmt::Display for ScreeningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Screening Results ({}) ===", self.timestamp.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(
            f,
            "Posts: {} ({} positive / {} negative / {} unclear)",
            self.posts_analyzed,
            self.sentiment.positive,
            self.sentiment.negative,
            self.sentiment.unclear
        )?;
        writeln!(
            f,
            "Tickers: {} | Expiration: {}",
            if self.tickers_screened.is_empty() {
                "-".to_string()
            } else {
                self.tickers_screened.join(", ")
            },
            self.expiration
        )?;

        if self.candidates.is_empty() {
            return writeln!(f, "No candidates passed the safety filters.");
        }

        writeln!(
            f,
            "{:<6} {:>8} {:>7} {:>8} {:>7} {:>6} {:>10}",
            "TICKER", "STRIKE", "MID", "YIELD%", "DELTA", "OI", "COLLATERAL"
        )?;
        for c in &self.candidates {
            writeln!(
                f,
                "{:<6} {:>8} {:>7} {:>8} {:>7} {:>6} {:>10}",
                c.ticker,
                c.strike,
                c.mid,
                c.weekly_yield_pct().round_dp(2),
                c.delta.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                c.open_interest,
                c.collateral(),
            )?;
        }

        let collateral: Decimal = total_collateral(&self.candidates);
        write!(f, "Total collateral for one of each: ${collateral}")
    }
}
