//! Date and time-specification parsing.
//!
//! A reminder's `times` list mixes absolute clock times with offsets that
//! count back from the first absolute time in the list. Resolution never
//! fails a whole row: an entry that cannot be resolved yields `None` and the
//! caller moves on to the next one.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ScheduleError, ScheduleResult};

/// Accepted input date formats, in the order they are tried.
const INPUT_DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y"];

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    At(NaiveTime),
    MinutesBefore(i64),
    HoursBefore(i64),
}

impl TimeSpec {
    pub fn parse(raw: &str) -> Option<TimeSpec> {
        let s = raw.trim();
        if let Some(t) = parse_clock_time(s) {
            return Some(TimeSpec::At(t));
        }

        let lower = s.to_lowercase();

        // Compact forms written by older versions: `30min-before`, `1hr-before`
        let (count, unit) = if let Some(n) = lower.strip_suffix("min-before") {
            (n.trim(), "min")
        } else if let Some(n) = lower.strip_suffix("hr-before") {
            (n.trim(), "hr")
        } else {
            let mut words = lower.split_whitespace();
            let (Some(n), Some(unit), Some("before"), None) =
                (words.next(), words.next(), words.next(), words.next())
            else {
                return None;
            };
            (n, unit)
        };

        let n = count.parse::<i64>().ok().filter(|n| *n >= 0)?;
        match unit {
            "minute" | "minutes" | "min" | "mins" => Some(TimeSpec::MinutesBefore(n)),
            "hour" | "hours" | "hr" | "hrs" => Some(TimeSpec::HoursBefore(n)),
            _ => None,
        }
    }
}

/// Parse `HH:MM` (24-hour).
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Parse operator date input into a calendar date; first matching format wins.
pub fn parse_input_date(raw: &str) -> ScheduleResult<NaiveDate> {
    let s = raw.trim();
    INPUT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| ScheduleError::MalformedDate(raw.to_string()))
}

/// Normalize operator date input to `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> ScheduleResult<String> {
    Ok(parse_input_date(raw)?.format(CANONICAL_DATE_FORMAT).to_string())
}

/// Parse a stored canonical date cell.
pub fn parse_stored_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), CANONICAL_DATE_FORMAT).ok()
}

/// The first absolute entry of a time list, used as the anchor for offsets.
pub fn primary_time<S: AsRef<str>>(specs: &[S]) -> Option<NaiveTime> {
    specs.iter().find_map(|s| match TimeSpec::parse(s.as_ref()) {
        Some(TimeSpec::At(t)) => Some(t),
        _ => None,
    })
}

/// Resolve one raw time specification to an absolute instant on `date`.
pub fn resolve(date: NaiveDate, primary: Option<NaiveTime>, spec: &str) -> Option<NaiveDateTime> {
    match TimeSpec::parse(spec)? {
        TimeSpec::At(t) => Some(date.and_time(t)),
        TimeSpec::MinutesBefore(n) => {
            let anchor = date.and_time(primary?);
            anchor.checked_sub_signed(Duration::try_minutes(n)?)
        }
        TimeSpec::HoursBefore(n) => {
            let anchor = date.and_time(primary?);
            anchor.checked_sub_signed(Duration::try_hours(n)?)
        }
    }
}
