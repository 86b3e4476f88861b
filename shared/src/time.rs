use chrono::{NaiveDate, NaiveTime};
use std::fmt::Write;

pub const MISSING_TIME: &str = "--:--";

/// Normalize a time-input value to `HH:MM:SS`. `HH:MM` gains `:00`.
/// Returns `None` for empty or unparseable input.
pub fn normalize_time(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()?;
    Some(parsed.format("%H:%M:%S").to_string())
}

/// First five characters of a schedule time (`HH:MM:SS` -> `HH:MM`).
pub fn short_time(raw: &str) -> &str {
    match raw.char_indices().nth(5) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

/// Pick the first present time and shorten it, or fall back to `--:--`.
pub fn first_time<'a>(primary: Option<&'a str>, secondary: Option<&'a str>) -> &'a str {
    primary
        .filter(|t| !t.is_empty())
        .or(secondary.filter(|t| !t.is_empty()))
        .map(short_time)
        .unwrap_or(MISSING_TIME)
}

pub fn format_clock(time: NaiveTime) -> String {
    let mut out = String::with_capacity(8);
    write_clock(&mut out, time);
    out
}

pub fn write_clock(buf: &mut String, time: NaiveTime) {
    buf.clear();
    let _ = write!(buf, "{}", time.format("%H:%M:%S"));
}

/// Value for an `<input type="time">`.
pub fn input_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Value for an `<input type="date">`.
pub fn input_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_minutes_precision() {
        assert_eq!(normalize_time("09:05").as_deref(), Some("09:05:00"));
    }

    #[test]
    fn keeps_seconds_precision() {
        assert_eq!(normalize_time("23:59:30").as_deref(), Some("23:59:30"));
    }

    #[test]
    fn rejects_garbage_time() {
        assert_eq!(normalize_time(""), None);
        assert_eq!(normalize_time("25:00"), None);
        assert_eq!(normalize_time("soon"), None);
    }

    #[test]
    fn shortens_schedule_times() {
        assert_eq!(short_time("07:45:00"), "07:45");
        assert_eq!(short_time("7:45"), "7:45");
    }

    #[test]
    fn first_time_falls_back() {
        assert_eq!(first_time(Some("10:15:00"), Some("10:10:00")), "10:15");
        assert_eq!(first_time(None, Some("10:10:00")), "10:10");
        assert_eq!(first_time(Some(""), None), MISSING_TIME);
    }

    #[test]
    fn formats_clock() {
        let t = NaiveTime::from_hms_opt(8, 3, 9).unwrap();
        assert_eq!(format_clock(t), "08:03:09");
        assert_eq!(input_time(t), "08:03");
    }

    #[test]
    fn round_trips_input_date() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(parse_input_date(&input_date(d)), Some(d));
        assert_eq!(parse_input_date("08.03.2026"), None);
    }
}
