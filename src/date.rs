//! Date header normalization
//!
//! Accepts the RFC 5322 form and the variants seen in the wild, and
//! returns a UTC timestamp. Anything ambiguous yields `None`: a missing
//! date is better than a wrong one.

use crate::config::DEFAULT_YEAR_PIVOT;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use tracing::debug;

// [weekday,] day month year hour:minute[:second] [offset [name] | name] [(comment)]
static RFC822_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z]+\s*,?\s*)?(\d{1,2})[\s-]+([A-Za-z]+)\.?[\s-]+(\d{2,4})\s+(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*(?:([+-]\d{2}:?\d{2})(?:\s+[A-Za-z]+)?|([A-Za-z]+)))?\s*(?:\(.*\))?$",
    )
    .unwrap()
});

// weekday month day hour:minute[:second] year
static ASCTIME_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]+\s+([A-Za-z]+)\s+(\d{1,2})\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s+(\d{4})$")
        .unwrap()
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Normalize a Date header value with the default two-digit year pivot
#[must_use]
pub fn normalize_date(value: &str) -> Option<DateTime<Utc>> {
    normalize_date_with_pivot(value, DEFAULT_YEAR_PIVOT)
}

/// Normalize a Date header value.
///
/// Two-digit years below `pivot` land in the 2000s, the rest in the 1900s.
/// A missing zone is taken as UTC; an unknown zone name rejects the date.
/// The weekday, when present, is not checked against the date.
#[must_use]
pub fn normalize_date_with_pivot(value: &str, pivot: u16) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = parse_rfc822(trimmed, pivot)
        .or_else(|| parse_iso8601(trimmed))
        .or_else(|| parse_asctime(trimmed));

    if parsed.is_none() {
        debug!(date = %trimmed, "Unparseable date");
    }
    parsed
}

/// Canonical text form of a timestamp: RFC 3339, seconds precision, `Z`
#[must_use]
pub fn format_canonical(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_rfc822(value: &str, pivot: u16) -> Option<DateTime<Utc>> {
    let caps = RFC822_REGEX.captures(value)?;

    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year = expand_year(&caps[3], pivot)?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    let second: u32 = caps.get(6).map_or(Ok(0), |s| s.as_str().parse::<u32>()).ok()?;
    // a numeric offset wins over a trailing zone name
    let offset = match caps.get(7).or_else(|| caps.get(8)) {
        Some(zone) => zone_offset(zone.as_str())?,
        None => FixedOffset::east_opt(0)?,
    };

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    to_utc(&offset, &naive)
}

fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_asctime(value: &str) -> Option<DateTime<Utc>> {
    let caps = ASCTIME_REGEX.captures(value)?;

    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let hour: u32 = caps[3].parse().ok()?;
    let minute: u32 = caps[4].parse().ok()?;
    let second: u32 = caps.get(5).map_or(Ok(0), |s| s.as_str().parse::<u32>()).ok()?;
    let year: i32 = caps[6].parse().ok()?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn to_utc(offset: &FixedOffset, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Month from a name or its three-letter (or longer) prefix
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|full| full.starts_with(&lower))
        .and_then(|index| u32::try_from(index + 1).ok())
}

fn expand_year(digits: &str, pivot: u16) -> Option<i32> {
    let year: i32 = digits.parse().ok()?;
    Some(match digits.len() {
        2 if year < i32::from(pivot) => 2000 + year,
        2 | 3 => 1900 + year,
        _ => year,
    })
}

/// Numeric offsets and the zone names RFC 5322 still allows
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if let Some(sign) = zone.chars().next().filter(|c| *c == '+' || *c == '-') {
        let digits: String = zone[1..].chars().filter(char::is_ascii_digit).collect();
        let hours: i32 = digits.get(..2)?.parse().ok()?;
        let minutes: i32 = digits.get(2..4)?.parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        let seconds = hours * 3600 + minutes * 60;
        return FixedOffset::east_opt(if sign == '-' { -seconds } else { seconds });
    }

    let hours = match zone.to_ascii_uppercase().as_str() {
        "UT" | "UTC" | "GMT" | "Z" => 0,
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => {
            debug!(zone, "Unknown time zone name");
            return None;
        }
    };
    FixedOffset::east_opt(hours * 3600)
}
