use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::sentiment::LabelDistribution;
use crate::tickers::MentionCounts;

/// One put contract offered for a cash-secured sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionCandidate {
    pub ticker: String,
    pub strike: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub mid: Decimal,
    pub open_interest: u64,
    #[serde(default)]
    pub volume: Option<u64>,
    pub expiration: NaiveDate,
    #[serde(default)]
    pub implied_volatility: Option<Decimal>,
    /// Put delta as quoted (negative); filters compare its magnitude.
    #[serde(default)]
    pub delta: Option<Decimal>,
    #[serde(default)]
    pub next_earnings: Option<NaiveDate>,
}

impl OptionCandidate {
    /// Bid-ask spread as a percentage of mid. `None` when mid is not positive.
    pub fn bid_ask_spread_pct(&self) -> Option<Decimal> {
        if self.mid <= Decimal::ZERO {
            return None;
        }
        Some((self.ask - self.bid) / self.mid * dec!(100))
    }

    /// Premium over collateral for one contract, as a percentage.
    pub fn weekly_yield_pct(&self) -> Decimal {
        if self.strike <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.mid / self.strike * dec!(100)
    }

    /// Cash needed to secure one contract.
    pub fn collateral(&self) -> Decimal {
        self.strike * dec!(100)
    }
}

/// Outcome of one screening run.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResult {
    pub timestamp: DateTime<Utc>,
    pub posts_analyzed: usize,
    pub sentiment: LabelDistribution,
    pub mentions: MentionCounts,
    pub tickers_screened: Vec<String>,
    pub expiration: NaiveDate,
    /// Sorted by weekly yield, highest first.
    pub candidates: Vec<OptionCandidate>,
}
