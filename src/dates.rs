//! Spreadsheet date normalization
//!
//! Converts legacy spreadsheet numeric date serials and textual dates into
//! canonical calendar dates. Day 1 of the serial epoch is 1900-01-01, and
//! serials of 60 and above carry the historical off-by-one from the
//! nonexistent 1900-02-29, so they are shifted back one day before the
//! epoch offset is applied.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// A serial that cannot represent a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid date serial: {0}")]
pub struct InvalidSerial(pub f64);

const SECONDS_PER_DAY: i64 = 86_400;

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static ISO_DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?Z?$").unwrap()
});

static SLASH_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").unwrap());

fn epoch() -> NaiveDate {
    // Day 1 of the serial calendar. The constant is valid, so the
    // fallback is unreachable.
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Convert a spreadsheet date serial into a calendar date.
///
/// Serials are 1-indexed (serial 1 = 1900-01-01). Serials >= 60 are shifted
/// back one day to compensate for the phantom leap day.
pub fn serial_to_date(serial: f64) -> Result<NaiveDate, InvalidSerial> {
    if !serial.is_finite() || serial < 1.0 {
        return Err(InvalidSerial(serial));
    }
    let mut days = serial.trunc() as i64;
    if days >= 60 {
        days -= 1;
    }
    epoch()
        .checked_add_signed(Duration::days(days - 1))
        .ok_or(InvalidSerial(serial))
}

/// Convert a serial into a `"YYYY-MM-DD"` string.
///
/// Invalid serials yield `None` rather than an error: this feeds bulk row
/// processing where one bad cell must not abort the batch.
pub fn serial_to_iso_string(serial: f64) -> Option<String> {
    serial_to_date(serial)
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Convert a serial into a date-time, decoding the fractional part as a
/// time-of-day at seconds resolution.
///
/// A fraction that rounds up to a full day carries into the next date.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let mut date = serial_to_date(serial).ok()?;
    let mut seconds = (serial.fract() * SECONDS_PER_DAY as f64).round() as i64;
    if seconds >= SECONDS_PER_DAY {
        date = date.checked_add_signed(Duration::days(1))?;
        seconds -= SECONDS_PER_DAY;
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)?;
    Some(NaiveDateTime::new(date, time))
}

/// Parse a textual date cell.
///
/// Accepts ISO `YYYY-MM-DD` and US-style `MM/DD/YYYY` (two- or four-digit
/// year). Date-times are truncated to their date component.
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if ISO_DATE_RE.is_match(value) {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    }
    if ISO_DATETIME_RE.is_match(value) {
        return parse_datetime_text(value).map(|dt| dt.date());
    }
    if SLASH_DATE_RE.is_match(value) {
        return NaiveDate::parse_from_str(value, "%m/%d/%Y")
            .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%y"))
            .ok();
    }
    None
}

/// Parse a textual date-time cell (ISO, `T` or space separated).
pub fn parse_datetime_text(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches('Z');
    if !ISO_DATETIME_RE.is_match(value) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_one_is_epoch() {
        assert_eq!(serial_to_date(1.0).unwrap(), ymd(1900, 1, 1));
    }

    #[test]
    fn test_serials_below_sixty_use_direct_offset() {
        assert_eq!(serial_to_date(2.0).unwrap(), ymd(1900, 1, 2));
        assert_eq!(serial_to_date(31.0).unwrap(), ymd(1900, 1, 31));
        assert_eq!(serial_to_date(59.0).unwrap(), ymd(1900, 2, 28));
    }

    #[test]
    fn test_leap_bug_correction_at_sixty() {
        // The phantom 1900-02-29 collapses onto the 28th; the calendar
        // resumes at serial 61.
        assert_eq!(serial_to_date(60.0).unwrap(), ymd(1900, 2, 28));
        assert_eq!(serial_to_date(61.0).unwrap(), ymd(1900, 3, 1));
    }

    #[test]
    fn test_serial_to_date_is_monotonic() {
        let mut prev = serial_to_date(1.0).unwrap();
        for s in 2..1000 {
            let next = serial_to_date(s as f64).unwrap();
            assert!(next >= prev, "serial {} went backwards", s);
            prev = next;
        }
    }

    #[test]
    fn test_modern_serial() {
        // 2024-01-15 in the corrected calendar.
        assert_eq!(serial_to_date(45306.0).unwrap(), ymd(2024, 1, 15));
    }

    #[test]
    fn test_invalid_serials() {
        assert!(serial_to_date(0.0).is_err());
        assert!(serial_to_date(-3.0).is_err());
        assert!(serial_to_date(f64::NAN).is_err());
        assert!(serial_to_date(f64::INFINITY).is_err());
    }

    #[test]
    fn test_iso_string_never_panics() {
        assert_eq!(serial_to_iso_string(0.5), None);
        assert_eq!(serial_to_iso_string(f64::NAN), None);
        assert_eq!(serial_to_iso_string(45306.0).as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_datetime_integer_serial_has_zero_time() {
        let dt = serial_to_datetime(45306.0).unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_datetime_half_day_is_noon() {
        let dt = serial_to_datetime(45306.5).unwrap();
        assert_eq!(dt.date(), ymd(2024, 1, 15));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_datetime_fraction_carries_into_next_day() {
        let dt = serial_to_datetime(45306.9999999).unwrap();
        assert_eq!(dt.date(), ymd(2024, 1, 16));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_text() {
        assert_eq!(parse_date_text("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("1/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("01/15/24"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("2024-01-15T08:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("2024-13-40"), None);
    }

    #[test]
    fn test_parse_datetime_text() {
        let dt = parse_datetime_text("2024-01-15T08:30:00").unwrap();
        assert_eq!(dt.date(), ymd(2024, 1, 15));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());

        let dt = parse_datetime_text("2024-01-15 08:30:00Z").unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());

        assert!(parse_datetime_text("2024-01-15").is_none());
    }
}
