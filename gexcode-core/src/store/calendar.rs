//! Trading-day arithmetic. Weekends are the only non-trading days.

use chrono::{Datelike, NaiveDate, Weekday};

/// How many trading days a snapshot lookup walks back before giving up.
pub const LOOKBACK_TRADING_DAYS: usize = 5;

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The closest weekday strictly before `date`.
pub fn previous_trading_day(date: NaiveDate) -> NaiveDate {
    let mut current = date;
    loop {
        current = current.pred_opt().unwrap_or(NaiveDate::MIN);
        if current == NaiveDate::MIN || is_trading_day(current) {
            return current;
        }
    }
}

/// `count` trading days before `date`, most recent first.
pub fn trading_days_before(date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = date;
    for _ in 0..count {
        current = previous_trading_day(current);
        days.push(current);
    }
    days
}

/// `YYYYMMDD`, the stamp every dated artifact uses.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn parse_date_stamp(stamp: &str) -> Option<NaiveDate> {
    if stamp.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn monday_steps_back_to_friday() {
        // 2025-03-10 is a Monday
        assert_eq!(previous_trading_day(d(2025, 3, 10)), d(2025, 3, 7));
        assert_eq!(previous_trading_day(d(2025, 3, 9)), d(2025, 3, 7));
        assert_eq!(previous_trading_day(d(2025, 3, 12)), d(2025, 3, 11));
    }

    #[test]
    fn lookback_skips_weekends() {
        let days = trading_days_before(d(2025, 3, 11), 3);
        assert_eq!(days, vec![d(2025, 3, 10), d(2025, 3, 7), d(2025, 3, 6)]);
    }

    #[test]
    fn stamp_round_trip() {
        assert_eq!(date_stamp(d(2025, 1, 2)), "20250102");
        assert_eq!(parse_date_stamp("20250102"), Some(d(2025, 1, 2)));
        assert_eq!(parse_date_stamp("2025012"), None);
        assert_eq!(parse_date_stamp("20251302"), None);
    }
}
