// src/core/dates.rs
// Date/time extraction shared by the adapters. Sources disagree wildly:
// REST APIs hand out "2026-03-15 20:30:00" or RFC 3339, HTML pages bury
// "9 febbraio 2026 ... ore 20.30" in free text.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

const ITALIAN_MONTHS: [&str; 12] = [
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno",
    "luglio", "agosto", "settembre", "ottobre", "novembre", "dicembre",
];

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})[.:](\d{2})").unwrap());

// "ore 20.30" — the phrasing every source uses when it states a start time.
static ORE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ore\s+(\d{1,2})[.:](\d{2})").unwrap());

// "9 febbraio 2026", optionally followed by "... ore 20.30" on the same line.
static ITALIAN_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s+([a-zàèéìòùáí]+)\s+(\d{4})(?:.*?ore\s+(\d{1,2})[.:](\d{2}))?")
        .unwrap()
});

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    ITALIAN_MONTHS.iter().position(|m| *m == lower).map(|i| i as u32 + 1)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A zero-padded "HH:MM", or None when out of 24h range. Guards the
/// extraction paths against date-like numbers ("dal 26.10 al 30.11").
fn checked_time(hour: u32, minute: u32) -> Option<String> {
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{hour:02}:{minute:02}"))
}

/// First plausible "HH.MM" or "HH:MM" in `text`, zero-padded, or None.
/// An "ore"-anchored match wins over bare number pairs; candidates
/// outside the 24h clock are skipped.
pub fn extract_time(text: &str) -> Option<String> {
    if let Some(caps) = ORE_TIME_RE.captures(text) {
        if let Some(t) = checked_time(caps[1].parse().ok()?, caps[2].parse().ok()?) {
            return Some(t);
        }
    }
    for caps in TIME_RE.captures_iter(text) {
        let (Ok(hour), Ok(minute)) = (caps[1].parse(), caps[2].parse()) else { continue };
        if let Some(t) = checked_time(hour, minute) {
            return Some(t);
        }
    }
    None
}

fn fmt_time(hour: u32, minute: u32) -> Option<String> {
    // Midnight start times mean "time not specified" in every source API.
    if hour == 0 && minute == 0 {
        None
    } else {
        Some(format!("{hour:02}:{minute:02}"))
    }
}

/// Split an ISO-ish datetime into (ISO date, optional HH:MM).
/// Accepts "2026-03-15 20:30:00", "2026-03-15T20:30:00", RFC 3339 with
/// offset or trailing Z, and bare "2026-03-15".
pub fn split_datetime(s: &str) -> Option<(String, Option<String>)> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            use chrono::Timelike;
            return Some((dt.date().to_string(), fmt_time(dt.hour(), dt.minute())));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s.replace("Z", "+00:00")) {
        use chrono::Timelike;
        return Some((dt.date_naive().to_string(), fmt_time(dt.hour(), dt.minute())));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some((d.to_string(), None));
    }
    None
}

/// Pull an event date (and time, if adjacent) out of free text.
/// Italian phrasing first, then a bare ISO date.
pub fn date_time_from_text(text: &str) -> Option<(String, Option<String>)> {
    if let Some(caps) = ITALIAN_DATE_RE.captures(text) {
        if let Some(month) = month_number(&caps[2]) {
            let day: u32 = caps[1].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let time = match (caps.get(4), caps.get(5)) {
                    (Some(h), Some(m)) => checked_time(
                        h.as_str().parse().ok()?,
                        m.as_str().parse().ok()?,
                    ),
                    _ => None,
                };
                return Some((date.to_string(), time));
            }
        }
    }
    if let Some(caps) = ISO_DATE_RE.captures(text) {
        let date = caps[1].to_string();
        if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok() {
            let tail = &text[caps.get(1).unwrap().end()..];
            return Some((date, extract_time(tail)));
        }
    }
    None
}
