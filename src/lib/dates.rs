//! Spanish long-form date formatting for user-facing text.
//!
//! Every date printed in a generated document goes through [`format_spanish`]. Date-time values
//! are converted to the institution's local time (UTC-3); date-only values are printed as-is.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Hours behind UTC of the local time used in documents.
pub const LOCAL_UTC_OFFSET_HOURS: i64 = 3;

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A parsed ISO-8601 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoValue {
    Date(NaiveDate),
    /// A date-time normalised to UTC. Values without an offset are assumed to be UTC.
    DateTime(NaiveDateTime),
}

impl IsoValue {
    pub fn date(&self) -> NaiveDate {
        match self {
            IsoValue::Date(d) => *d,
            IsoValue::DateTime(dt) => dt.date(),
        }
    }
}

/// Parses an ISO-8601 date (`2024-03-01`) or date-time (`2024-02-20T14:30:00Z`,
/// `2024-02-20T14:30:00-03:00`, `2024-02-20T14:30:00`).
pub fn parse_iso(value: &str) -> Option<IsoValue> {
    let value = value.trim();
    if value.contains('T') || value.contains(' ') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(IsoValue::DateTime(dt.naive_utc()));
        }
        return NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(IsoValue::DateTime);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(IsoValue::Date)
}

fn long_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Formats an ISO-8601 value as Spanish text.
///
/// # Returns
/// * `""` for `None` or blank input
/// * `"1 de marzo de 2024"` for date-only input
/// * `"20 de febrero de 2024 a las 11:30"` for date-times, shifted to UTC-3
/// * the input unchanged when it cannot be parsed
///
/// # Example
/// ```rust
/// use internship2pdf::dates::format_spanish;
///
/// assert_eq!(format_spanish(Some("2024-02-20T14:30:00Z")), "20 de febrero de 2024 a las 11:30");
/// assert_eq!(format_spanish(None), "");
/// ```
pub fn format_spanish(value: Option<&str>) -> String {
    let raw = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return String::new(),
    };

    match parse_iso(raw) {
        Some(IsoValue::Date(date)) => long_date(date),
        Some(IsoValue::DateTime(utc)) => {
            let local = utc - Duration::hours(LOCAL_UTC_OFFSET_HOURS);
            format!(
                "{} a las {:02}:{:02}",
                long_date(local.date()),
                local.hour(),
                local.minute()
            )
        }
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(format_spanish(None), "");
        assert_eq!(format_spanish(Some("")), "");
        assert_eq!(format_spanish(Some("   ")), "");
    }

    #[test]
    fn test_date_only_is_not_shifted() {
        assert_eq!(format_spanish(Some("2024-03-01")), "1 de marzo de 2024");
        assert_eq!(format_spanish(Some("2025-12-31")), "31 de diciembre de 2025");
    }

    #[test]
    fn test_utc_datetime_is_shifted() {
        assert_eq!(
            format_spanish(Some("2024-02-20T14:30:00Z")),
            "20 de febrero de 2024 a las 11:30"
        );
        // Crosses midnight backwards.
        assert_eq!(
            format_spanish(Some("2024-03-01T01:05:00Z")),
            "29 de febrero de 2024 a las 22:05"
        );
    }

    #[test]
    fn test_offset_and_naive_datetimes() {
        assert_eq!(
            format_spanish(Some("2024-02-20T14:30:00-03:00")),
            "20 de febrero de 2024 a las 14:30"
        );
        assert_eq!(
            format_spanish(Some("2026-01-05T10:30:00")),
            "5 de enero de 2026 a las 07:30"
        );
        assert_eq!(
            format_spanish(Some("2026-01-05T10:30:00.123")),
            "5 de enero de 2026 a las 07:30"
        );
    }

    #[test]
    fn test_unparsable_is_returned_unchanged() {
        assert_eq!(format_spanish(Some("not-a-date")), "not-a-date");
        assert_eq!(format_spanish(Some("2024-13-01")), "2024-13-01");
        assert_eq!(format_spanish(Some("2024-02-20Tnoon")), "2024-02-20Tnoon");
    }

    #[test]
    fn test_parse_iso_kinds() {
        assert!(matches!(parse_iso("2024-03-01"), Some(IsoValue::Date(_))));
        assert!(matches!(
            parse_iso("2024-03-01T08:00"),
            Some(IsoValue::DateTime(_))
        ));
        assert_eq!(
            parse_iso("2024-03-01T08:00:00Z").map(|v| v.date()),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_iso("01/03/2024"), None);
    }
}
