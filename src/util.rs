// Utility helpers for parsing dates and formatting numbers.
//
// This module centralizes the "dirty" CSV date handling so the loader and
// aggregator can assume typed values.
use chrono::{DateTime, NaiveDate, NaiveTime};
use num_format::{Locale, ToFormattedString};

// Slash dates in docket exports are day-first.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Parse a CSV cell into a date, returning `None` for blanks and anything
/// that cannot be read.
///
/// - Trims whitespace.
/// - Accepts ISO (`2023-01-31`), slashed ISO, and day-first
///   (`31/01/2023`, `31-01-2023`) dates.
/// - Ambiguous slash dates are always day-first: `01/02/2023` is
///   1 February, not 2 January. A month-first reader would place such a
///   date in a different month; the year is the same either way.
/// - Accepts a trailing time of day separated by a space or `T`; the time
///   must itself be valid but is discarded.
/// - Falls back to RFC 3339 for timestamps with an offset.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let (date_part, time_part) = match s.find([' ', 'T']) {
        Some(idx) => (&s[..idx], s[idx + 1..].trim()),
        None => (s, ""),
    };
    if !time_part.is_empty()
        && !TIME_FORMATS
            .iter()
            .any(|fmt| NaiveTime::parse_from_str(time_part, fmt).is_ok())
    {
        return DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Treat blank cells as missing; otherwise return the trimmed text.
pub fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Share of the docket still open: `pending / (pending + cleared) * 100`,
/// rounded to two decimals. Zero when nothing is pending or cleared.
pub fn congestion_rate(pending: usize, cleared: usize) -> f64 {
    let denom = pending + cleared;
    if denom == 0 {
        return 0.0;
    }
    round2(pending as f64 / denom as f64 * 100.0)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_and_day_first_dates() {
        assert_eq!(parse_date_safe(Some("2023-01-31")), Some(ymd(2023, 1, 31)));
        assert_eq!(parse_date_safe(Some("2023/01/31")), Some(ymd(2023, 1, 31)));
        assert_eq!(parse_date_safe(Some("31/01/2023")), Some(ymd(2023, 1, 31)));
        assert_eq!(parse_date_safe(Some("31-01-2023")), Some(ymd(2023, 1, 31)));
        assert_eq!(parse_date_safe(Some("  2023-01-31  ")), Some(ymd(2023, 1, 31)));
    }

    #[test]
    fn ambiguous_slash_dates_are_day_first() {
        assert_eq!(parse_date_safe(Some("01/02/2023")), Some(ymd(2023, 2, 1)));
        assert_eq!(parse_date_safe(Some("12/01/2023")), Some(ymd(2023, 1, 12)));
        assert_eq!(parse_date_safe(Some("01/13/2023")), None);
    }

    #[test]
    fn parses_timestamps() {
        assert_eq!(parse_date_safe(Some("2023-05-02 14:30:00")), Some(ymd(2023, 5, 2)));
        assert_eq!(parse_date_safe(Some("2023-05-02T14:30")), Some(ymd(2023, 5, 2)));
        assert_eq!(parse_date_safe(Some("02/05/2023 08:00:00.250")), Some(ymd(2023, 5, 2)));
        assert_eq!(parse_date_safe(Some("2023-05-02T23:30:00-03:00")), Some(ymd(2023, 5, 2)));
    }

    #[test]
    fn unparsable_dates_become_none() {
        assert_eq!(parse_date_safe(None), None);
        assert_eq!(parse_date_safe(Some("")), None);
        assert_eq!(parse_date_safe(Some("   ")), None);
        assert_eq!(parse_date_safe(Some("not a date")), None);
        assert_eq!(parse_date_safe(Some("2023-13-01")), None);
        assert_eq!(parse_date_safe(Some("2023-02-30")), None);
        assert_eq!(parse_date_safe(Some("2023-05-02 25:99")), None);
    }

    #[test]
    fn congestion_rate_guards_zero_denominator() {
        assert_eq!(congestion_rate(0, 0), 0.0);
        assert_eq!(congestion_rate(1, 1), 50.0);
        assert_eq!(congestion_rate(1, 2), 33.33);
        assert_eq!(congestion_rate(2, 1), 66.67);
        assert_eq!(congestion_rate(5, 0), 100.0);
        assert_eq!(congestion_rate(0, 5), 0.0);
    }

    #[test]
    fn formats_numbers_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(50.0, 2), "50.00");
        assert_eq!(format_number(-3.5, 1), "-3.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855usize), "9,855");
    }

    #[test]
    fn blank_cells_are_missing() {
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" Civil "), Some("Civil".to_string()));
    }
}
