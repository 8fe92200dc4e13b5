//! Lenient field parsing for source tables.
//!
//! Source spreadsheets mix ISO and Brazilian date formats, write counts as
//! `"3"` or `"3.0"`, and spell booleans in Portuguese. Everything here
//! returns `None` (or a zero) instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// A parsed timestamp and whether the source carried a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// The instant, at midnight UTC for date-only values.
    pub timestamp: DateTime<Utc>,
    /// `false` when the source was a bare date.
    pub has_time: bool,
}

/// Parses a timestamp in any supported format.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_parts(raw).map(|parsed| parsed.timestamp)
}

/// Parses a timestamp, remembering whether it had a time component.
#[must_use]
pub fn parse_timestamp_parts(raw: &str) -> Option<ParsedTimestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedTimestamp {
            timestamp: dt.with_timezone(&Utc),
            has_time: true,
        });
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ParsedTimestamp {
                timestamp: naive.and_utc(),
                has_time: true,
            });
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(ParsedTimestamp {
                timestamp: naive.and_utc(),
                has_time: false,
            });
        }
    }

    log::trace!("Unparseable timestamp: {raw:?}");
    None
}

/// Parses a non-negative count. Accepts `"3"`, `"3.0"` and `"3,0"`.
/// Missing, negative, or garbage values are 0.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn parse_count(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    if let Ok(value) = raw.parse::<u32>() {
        return value;
    }
    match parse_decimal(Some(raw)) {
        Some(value) if value > 0.0 => value.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

/// Parses a decimal quantity, accepting a comma decimal separator.
#[must_use]
pub fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses a boolean flag. Missing values are `false`.
#[must_use]
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|raw| {
        matches!(
            raw.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "sim" | "s" | "ativa" | "ativo" | "active"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date_time() {
        let parsed = parse_timestamp_parts("2024-03-10 14:30:00").unwrap();
        assert_eq!(parsed.timestamp.to_string(), "2024-03-10 14:30:00 UTC");
        assert!(parsed.has_time);
    }

    #[test]
    fn parses_iso_t_separator_with_and_without_fraction() {
        let dt = parse_timestamp("2024-03-10T14:30:00.250").unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "14:30:00");
        let dt = parse_timestamp("2024-03-10T14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-03-10 14:30:00 UTC");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-03-10T14:30:00-03:00").unwrap();
        assert_eq!(dt.to_string(), "2024-03-10 17:30:00 UTC");
    }

    #[test]
    fn parses_brazilian_formats() {
        let dt = parse_timestamp("10/03/2024 22:15").unwrap();
        assert_eq!(dt.to_string(), "2024-03-10 22:15:00 UTC");
        let parsed = parse_timestamp_parts("10/03/2024").unwrap();
        assert_eq!(parsed.timestamp.to_string(), "2024-03-10 00:00:00 UTC");
        assert!(!parsed.has_time);
    }

    #[test]
    fn date_only_has_no_time() {
        let parsed = parse_timestamp_parts("2024-03-10").unwrap();
        assert!(!parsed.has_time);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("ontem").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn counts_are_lenient() {
        assert_eq!(parse_count(Some("3")), 3);
        assert_eq!(parse_count(Some(" 4.0 ")), 4);
        assert_eq!(parse_count(Some("2,0")), 2);
        assert_eq!(parse_count(Some("-1")), 0);
        assert_eq!(parse_count(Some("n/a")), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn decimals_accept_comma() {
        assert!((parse_decimal(Some("12,5")).unwrap() - 12.5).abs() < f64::EPSILON);
        assert!(parse_decimal(Some("NaN")).is_none());
        assert!(parse_decimal(Some("")).is_none());
    }

    #[test]
    fn flags() {
        assert!(parse_flag(Some("Sim")));
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("não")));
        assert!(!parse_flag(None));
    }
}
