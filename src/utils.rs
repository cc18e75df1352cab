//! Field parsing helpers shared by rating sources.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::constants::timestamps::{DATE_FORMATS, DATETIME_FORMATS};
use crate::types::Timestamp;

/// Split `line` on any of `delimiters`, dropping empty fields so runs of
/// delimiters collapse.
pub fn split_fields<'a>(line: &'a str, delimiters: &'a [char]) -> impl Iterator<Item = &'a str> {
    line.split(move |ch: char| delimiters.contains(&ch))
        .filter(|field| !field.is_empty())
}

/// Parse a finite rating value.
pub fn parse_rating(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite())
}

/// Parse a timestamp as integer epoch, fractional epoch (truncated), or a
/// date/time string (interpreted as UTC, seconds since the epoch).
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(epoch) = value.parse::<i64>() {
        return Some(epoch);
    }
    if let Ok(epoch) = value.parse::<f64>() {
        return epoch.is_finite().then_some(epoch.trunc() as i64);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp());
        }
    }
    None
}

/// Map `value` to `1.0` above `threshold` and `0.0` otherwise; identity without a threshold.
pub fn binarize(value: f64, threshold: Option<f64>) -> f64 {
    match threshold {
        Some(threshold) if value > threshold => 1.0,
        Some(_) => 0.0,
        None => value,
    }
}

/// Strip one pair of matching single or double quotes.
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fields_collapses_mixed_delimiters() {
        let delimiters = [' ', '\t', ',', ';'];
        let fields: Vec<&str> = split_fields("1\t 2;;3.5,  1112486027", &delimiters).collect();
        assert_eq!(fields, vec!["1", "2", "3.5", "1112486027"]);
    }

    #[test]
    fn parse_rating_rejects_non_finite() {
        assert_eq!(parse_rating(" 4.5 "), Some(4.5));
        assert_eq!(parse_rating("NaN"), None);
        assert_eq!(parse_rating("inf"), None);
        assert_eq!(parse_rating("five"), None);
    }

    #[test]
    fn parse_timestamp_accepts_epochs_and_dates() {
        assert_eq!(parse_timestamp("1112486027"), Some(1_112_486_027));
        assert_eq!(parse_timestamp("1112486027.9"), Some(1_112_486_027));
        assert_eq!(parse_timestamp("-5"), Some(-5));
        assert_eq!(parse_timestamp("1970-01-02"), Some(86_400));
        assert_eq!(parse_timestamp("1970-01-01T00:01:00"), Some(60));
        assert_eq!(parse_timestamp("1970-01-01 00:00:30"), Some(30));
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn binarize_thresholds_values() {
        assert_eq!(binarize(4.0, Some(3.0)), 1.0);
        assert_eq!(binarize(3.0, Some(3.0)), 0.0);
        assert_eq!(binarize(2.5, None), 2.5);
    }

    #[test]
    fn unquote_strips_matching_quotes_only() {
        assert_eq!(unquote("'user 1'"), "user 1");
        assert_eq!(unquote("\"item\""), "item");
        assert_eq!(unquote("'mixed\""), "'mixed\"");
        assert_eq!(unquote("'"), "'");
    }
}
