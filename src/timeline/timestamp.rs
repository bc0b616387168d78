//! Display timestamp parsing.
//!
//! Messages arrive with a display string rather than a machine timestamp:
//! `HH:MM` for messages of the current day and `DD/MM/YYYY, HH:MM` otherwise.
//! Anything we cannot make sense of degrades to "now" so a single bad record
//! never breaks the chat view.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::clock::Clock;
use crate::message::ChatMessage;

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("time regex pattern is valid")
});

/// Parse a display timestamp into local wall time.
pub fn parse_timestamp(ts: &str, clock: &dyn Clock) -> NaiveDateTime {
    let now = clock.now();
    let ts = ts.trim();

    if !ts.contains('/') {
        return match parse_time_of_day(ts) {
            Some(time) => now.date().and_time(time),
            None => {
                tracing::debug!(timestamp = ts, "unparseable time, assuming now");
                now
            }
        };
    }

    let (date_part, time_part) = match ts.split_once(", ") {
        Some((date, time)) => (date, Some(time)),
        None => (ts, None),
    };

    let parts: Vec<&str> = date_part.split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        tracing::debug!(timestamp = ts, "date does not have three parts, assuming now");
        return now;
    };

    let Some(date) = parse_date(day, month, year) else {
        tracing::debug!(timestamp = ts, "invalid calendar date, assuming now");
        return now;
    };

    match time_part.map(parse_time_of_day) {
        None => date.and_time(NaiveTime::MIN),
        Some(Some(time)) => date.and_time(time),
        Some(None) => {
            tracing::debug!(timestamp = ts, "invalid time of day, assuming now");
            now
        }
    }
}

/// Point in time used to order `msg`: the canonical `sent_at` when the record
/// carries one, the parsed display string otherwise.
pub fn message_time(msg: &ChatMessage, clock: &dyn Clock) -> NaiveDateTime {
    msg.sent_at
        .unwrap_or_else(|| parse_timestamp(&msg.timestamp, clock))
}

/// Canonical `YYYY-MM-DD` key of a calendar day.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse "HH:MM" or "HH:MM:SS".
fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(s.trim())?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    let seconds: u32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

fn parse_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
