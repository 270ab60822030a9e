use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static VS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bvs\b\.?").expect("valid regex"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static AGE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r" U\d* ").expect("valid regex"));

/// Month number (1-12) from the first three letters of an English month name.
pub fn month_from_name(text: &str) -> Result<u32> {
    let prefix: String = text.trim().chars().take(3).collect::<String>().to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| Error::InvalidMonth(text.to_string()))
}

/// Decode a timesheet slot value such as `4.30` into a time of day.
///
/// The integer part is the hour and the two-digit fraction the minute.
/// Sheets write afternoon slots as 1..6, so any hour below 7 is moved to
/// the afternoon.
pub fn decode_time_slot(value: f64) -> Result<NaiveTime> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidTimeSlot(value.to_string()));
    }
    let mut hour = value.trunc() as u32;
    let minute = ((value - value.trunc()) * 100.0).round() as u32;
    if hour < 7 {
        hour += 12;
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| Error::InvalidTimeSlot(value.to_string()))
}

/// Turn a free-text division label into `"U<age> <Gender>"`.
///
/// `"u/13 girls Div3"` becomes `"U13 Girls"`. Gender letters are checked in
/// the order G, B, M with later hits winning, so a label carrying both a G
/// and an M reads as Mixed.
pub fn standardize_league(text: &str) -> Result<String> {
    let first = text.split_whitespace().next().unwrap_or("");
    let age = DIGITS
        .find(first)
        .map(|m| m.as_str())
        .ok_or_else(|| Error::MalformedLeague(text.to_string()))?;

    let upper = text.to_uppercase();
    let mut gender = None;
    if upper.contains('G') {
        gender = Some("Girls");
    }
    if upper.contains('B') {
        gender = Some("Boys");
    }
    if upper.contains('M') {
        gender = Some("Mixed");
    }
    let gender = gender.unwrap_or_else(|| {
        warn!(league = %text, "Could not extract gender from league; assuming Boys");
        "Boys"
    });

    Ok(format!("U{} {}", age, gender))
}

/// Split `"MAGIC GOLD vs PIRANHAS NEON"` into title-cased team names.
pub fn split_teams(text: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = VS.split(text).map(str::trim).collect();
    match parts.as_slice() {
        [a, b] if !a.is_empty() && !b.is_empty() => Ok((title_case(a), title_case(b))),
        _ => Err(Error::MalformedMatchup(text.to_string())),
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Remove age-group tokens such as `" U14 "` from a team name.
pub fn strip_age_token(name: &str) -> String {
    AGE_TOKEN.replace_all(name, " ").into_owned()
}

/// First date on or after `today` that falls on `weekday`.
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(ahead as i64)
}
