//! Due-date parsing and timestamp display.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt::Display;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a user-entered due date.
///
/// Accepts RFC 3339, `datetime-local` style `YYYY-MM-DDTHH:MM` and a bare
/// `YYYY-MM-DD` (taken as 23:59 that day). Inputs without an offset are
/// interpreted in `tz`.
pub fn parse_due_date<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| NaiveTime::from_hms_opt(23, 59, 0).map(|t| date.and_time(t)))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp like `Mar 1, 2026, 10:00 AM` in `tz`
pub fn format_timestamp<Tz>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.with_timezone(tz).format("%b %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_parse_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

        assert_eq!(parse_due_date("2026-03-01T10:00:00Z", &Utc), Some(expected));
        assert_eq!(parse_due_date("2026-03-01T10:00", &Utc), Some(expected));
        assert_eq!(parse_due_date("2026-03-01 10:00:00", &Utc), Some(expected));
        assert_eq!(
            parse_due_date("2026-03-01", &Utc),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 0).unwrap())
        );
        assert_eq!(parse_due_date("tomorrow", &Utc), None);
    }

    #[test]
    fn test_parse_uses_timezone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            parse_due_date("2026-03-01T10:00", &plus_two),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 1, 15, 5, 0).unwrap();
        assert_eq!(format_timestamp(&dt, &Utc), "Mar 1, 2026, 03:05 PM");
    }
}
