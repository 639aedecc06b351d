//! US equity market calendar: NYSE full-day holidays and weekly expirations.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::US::Eastern;

/// Weekly options stop trading at the close; after this (Eastern) the
/// current Friday is no longer sellable.
const FRIDAY_CUTOFF: (u32, u32) = (15, 55);

/// Wall-clock time in New York for a UTC instant.
pub fn to_eastern(utc: DateTime<Utc>) -> NaiveDateTime {
    utc.with_timezone(&Eastern).naive_local()
}

/// Western Easter Sunday (anonymous Gregorian algorithm).
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut day = first_of_next.pred_opt()?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}

/// Saturday holidays move to Friday, Sunday holidays to Monday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// Full-day NYSE closures for `year`, as observed.
pub fn market_holidays(year: i32) -> Vec<NaiveDate> {
    // New Year's Day falling on a Saturday is not made up on Dec 31.
    let new_year = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| match d.weekday() {
        Weekday::Sat => None,
        _ => Some(observed(d)),
    });

    let juneteenth = if year >= 2022 {
        NaiveDate::from_ymd_opt(year, 6, 19).map(observed)
    } else {
        None
    };

    [
        new_year,
        NaiveDate::from_weekday_of_month_opt(year, 1, Weekday::Mon, 3),
        NaiveDate::from_weekday_of_month_opt(year, 2, Weekday::Mon, 3),
        easter_sunday(year).map(|d| d - Duration::days(2)),
        last_weekday_of_month(year, 5, Weekday::Mon),
        juneteenth,
        NaiveDate::from_ymd_opt(year, 7, 4).map(observed),
        NaiveDate::from_weekday_of_month_opt(year, 9, Weekday::Mon, 1),
        NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Thu, 4),
        NaiveDate::from_ymd_opt(year, 12, 25).map(observed),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn is_market_holiday(date: NaiveDate) -> bool {
    market_holidays(date.year()).contains(&date)
}

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_market_holiday(date)
}

/// The Friday whose weekly puts should be screened at `now`.
///
/// This is the coming Friday in New York. On a Friday at or after 15:55 ET, or
/// when that Friday is a market holiday, it moves a week out.
pub fn next_expiration(now: DateTime<Utc>) -> NaiveDate {
    let local = to_eastern(now);
    let today = local.date();

    let days_ahead = (Weekday::Fri.num_days_from_monday() + 7
        - today.weekday().num_days_from_monday())
        % 7;
    let mut friday = today + Duration::days(i64::from(days_ahead));

    if days_ahead == 0 && (local.hour(), local.minute()) >= FRIDAY_CUTOFF {
        friday += Duration::days(7);
    }
    while is_market_holiday(friday) {
        friday += Duration::days(7);
    }

    friday
}
