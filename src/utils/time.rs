//! Time utilities: parsing schedule clock times, device timestamps and
//! formatting fractional hours.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a schedule clock time ("HH:MM" or "HH:MM:SS").
pub fn parse_clock_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .ok()
}

/// Combine a calendar date with a schedule clock time.
pub fn time_on_date(date: NaiveDate, t: &str) -> Option<NaiveDateTime> {
    parse_clock_time(t).map(|time| date.and_time(time))
}

/// Parse a device timestamp and express it in site-local time.
///
/// Values carrying an offset (RFC 3339) are converted to UTC first; naive
/// values are taken as UTC. The result is shifted by `utc_offset_minutes`.
pub fn parse_device_timestamp(s: &str, utc_offset_minutes: i32) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let utc = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.naive_utc(),
        Err(_) => parse_naive(s)?,
    };

    Some(utc + Duration::minutes(utc_offset_minutes as i64))
}

/// Parse a stored local timestamp ("YYYY-MM-DD HH:MM:SS").
///
/// The wall-clock time is kept as written; an offset, if present, is dropped.
pub fn parse_local_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.naive_local()),
        Err(_) => parse_naive(s),
    }
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
}

pub fn format_local_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 9.6666… → "9.667"
pub fn format_hours(h: f64) -> String {
    format!("{:.3}", h)
}

/// HH:MM of an optional timestamp, or "--:--".
pub fn format_clock(dt: Option<NaiveDateTime>) -> String {
    dt.map(|d| d.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
