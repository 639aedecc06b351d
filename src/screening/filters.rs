//! Safety filters and yield ranking for cash-secured put candidates.

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ScreeningConfig;
use crate::screening::models::OptionCandidate;

/// Why a candidate was dropped. Checks run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    LowOpenInterest,
    NoQuote,
    WideSpread,
    DeltaOutOfRange,
    StrikeTooHigh,
    InsufficientCapital,
    EarningsBeforeExpiry,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowOpenInterest => write!(f, "open interest below minimum"),
            Self::NoQuote => write!(f, "no positive mid price"),
            Self::WideSpread => write!(f, "bid-ask spread too wide"),
            Self::DeltaOutOfRange => write!(f, "delta outside target range"),
            Self::StrikeTooHigh => write!(f, "strike above maximum"),
            Self::InsufficientCapital => write!(f, "collateral exceeds capital"),
            Self::EarningsBeforeExpiry => write!(f, "earnings inside blackout window"),
        }
    }
}

/// First filter the candidate fails, if any.
///
/// A candidate without a quoted delta is not judged on delta.
pub fn check(candidate: &OptionCandidate, config: &ScreeningConfig) -> Option<Rejection> {
    if candidate.open_interest < config.min_open_interest {
        return Some(Rejection::LowOpenInterest);
    }

    match candidate.bid_ask_spread_pct() {
        None => return Some(Rejection::NoQuote),
        Some(spread) if spread > config.max_spread_pct => return Some(Rejection::WideSpread),
        Some(_) => {}
    }

    if let Some(delta) = candidate.delta {
        let magnitude = delta.abs();
        if magnitude < config.delta_min || magnitude > config.delta_max {
            return Some(Rejection::DeltaOutOfRange);
        }
    }

    if candidate.strike > config.max_strike {
        return Some(Rejection::StrikeTooHigh);
    }

    if candidate.collateral() > config.capital {
        return Some(Rejection::InsufficientCapital);
    }

    if config.exclude_earnings {
        let blackout_end =
            candidate.expiration + Duration::days(i64::from(config.earnings_blackout_days));
        if candidate.next_earnings.is_some_and(|date| date <= blackout_end) {
            return Some(Rejection::EarningsBeforeExpiry);
        }
    }

    None
}

pub fn apply_safety_filters(
    candidates: Vec<OptionCandidate>,
    config: &ScreeningConfig,
) -> Vec<OptionCandidate> {
    candidates
        .into_iter()
        .filter(|c| match check(c, config) {
            Some(reason) => {
                debug!(ticker = %c.ticker, strike = %c.strike, %reason, "Candidate rejected");
                false
            }
            None => true,
        })
        .collect()
}

/// Highest weekly yield first; equal yields keep their input order.
pub fn rank_by_yield(candidates: &mut [OptionCandidate]) {
    candidates.sort_by(|a, b| b.weekly_yield_pct().cmp(&a.weekly_yield_pct()));
}

/// Sum of collateral across candidates.
pub fn total_collateral(candidates: &[OptionCandidate]) -> Decimal {
    candidates.iter().map(OptionCandidate::collateral).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn config() -> ScreeningConfig {
        ScreeningConfig {
            capital: dec!(10000),
            max_strike: dec!(100),
            min_open_interest: 200,
            max_spread_pct: dec!(5.0),
            delta_min: dec!(0.20),
            delta_max: dec!(0.35),
            exclude_earnings: true,
            earnings_blackout_days: 7,
            max_tickers: 10,
            min_mentions: 1,
            include_unclear_sentiment: false,
        }
    }

    fn put(ticker: &str, strike: Decimal, mid: Decimal) -> OptionCandidate {
        OptionCandidate {
            ticker: ticker.to_string(),
            strike,
            bid: mid - dec!(0.01),
            ask: mid + dec!(0.01),
            mid,
            open_interest: 1000,
            volume: Some(50),
            expiration: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            implied_volatility: None,
            delta: Some(dec!(-0.25)),
            next_earnings: None,
        }
    }

    #[test]
    fn test_passing_candidate() {
        assert_eq!(check(&put("AAPL", dec!(50), dec!(0.50)), &config()), None);
    }

    #[test]
    fn test_low_open_interest() {
        let mut c = put("AAPL", dec!(50), dec!(0.50));
        c.open_interest = 199;
        assert_eq!(check(&c, &config()), Some(Rejection::LowOpenInterest));
    }

    #[test]
    fn test_wide_spread_and_no_quote() {
        let mut c = put("AAPL", dec!(50), dec!(0.50));
        c.bid = dec!(0.40);
        c.ask = dec!(0.60);
        assert_eq!(check(&c, &config()), Some(Rejection::WideSpread));

        c.mid = Decimal::ZERO;
        assert_eq!(check(&c, &config()), Some(Rejection::NoQuote));
    }

    #[test]
    fn test_delta_range_uses_magnitude() {
        let mut c = put("AAPL", dec!(50), dec!(0.50));
        c.delta = Some(dec!(-0.40));
        assert_eq!(check(&c, &config()), Some(Rejection::DeltaOutOfRange));
        c.delta = Some(dec!(-0.10));
        assert_eq!(check(&c, &config()), Some(Rejection::DeltaOutOfRange));
        c.delta = Some(dec!(-0.35));
        assert_eq!(check(&c, &config()), None);
        c.delta = None;
        assert_eq!(check(&c, &config()), None);
    }

    #[test]
    fn test_strike_and_capital_limits() {
        let c = put("AAPL", dec!(120), dec!(1.00));
        assert_eq!(check(&c, &config()), Some(Rejection::StrikeTooHigh));

        let mut cfg = config();
        cfg.capital = dec!(4000);
        let c = put("AAPL", dec!(50), dec!(0.50));
        assert_eq!(check(&c, &cfg), Some(Rejection::InsufficientCapital));
    }

    #[test]
    fn test_earnings_blackout() {
        let mut c = put("AAPL", dec!(50), dec!(0.50));
        c.next_earnings = NaiveDate::from_ymd_opt(2025, 3, 12);
        assert_eq!(check(&c, &config()), Some(Rejection::EarningsBeforeExpiry));

        c.next_earnings = NaiveDate::from_ymd_opt(2025, 3, 20);
        assert_eq!(check(&c, &config()), None);

        let mut cfg = config();
        cfg.exclude_earnings = false;
        c.next_earnings = NaiveDate::from_ymd_opt(2025, 3, 5);
        assert_eq!(check(&c, &cfg), None);
    }

    #[test]
    fn test_rank_by_yield_descending_and_stable() {
        let mut candidates = vec![
            put("AAA", dec!(50), dec!(0.25)),
            put("BBB", dec!(40), dec!(0.40)),
            put("CCC", dec!(25), dec!(0.125)),
            put("DDD", dec!(20), dec!(0.30)),
        ];
        rank_by_yield(&mut candidates);
        let order: Vec<&str> = candidates.iter().map(|c| c.ticker.as_str()).collect();
        // 1.5%, 1.0%, 0.5%, 0.5% (AAA before CCC)
        assert_eq!(order, vec!["DDD", "BBB", "AAA", "CCC"]);
    }

    #[test]
    fn test_apply_filters_and_total_collateral() {
        let mut thin = put("THIN", dec!(30), dec!(0.30));
        thin.open_interest = 10;
        let kept = apply_safety_filters(
            vec![put("AAPL", dec!(50), dec!(0.50)), thin, put("SPY", dec!(20), dec!(0.50))],
            &config(),
        );
        assert_eq!(kept.len(), 2);
        assert_eq!(total_collateral(&kept), dec!(7000));
    }
}
