#![forbid(unsafe_code)]

//! Civil calendar dates (`YYYY-MM-DD`). No time zone conversion happens anywhere in here: a
//! contract that starts on `2024-05-01` starts on that calendar day wherever it is read.

use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateParseError {
    pub input: String,
}

impl std::fmt::Display for DateParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date (expected YYYY-MM-DD): {:?}", self.input)
    }
}

impl std::error::Error for DateParseError {}

pub fn parse_date(raw: &str) -> Result<Date, DateParseError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        DateParseError {
            input: raw.to_string(),
        }
    })
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| {
            format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                u8::from(date.month()),
                date.day()
            )
        })
}

/// Last day of a rental that starts on `start` and lasts `days` days, both ends inclusive.
///
/// `None` when `days` is zero or the result falls outside the representable calendar.
pub fn end_date(start: Date, days: u32) -> Option<Date> {
    if days == 0 {
        return None;
    }
    start.checked_add(Duration::days(i64::from(days) - 1))
}

/// Every calendar day from `start` to `end` inclusive, ascending. Empty when `start > end`.
pub fn period_dates(start: Date, end: Date) -> Vec<Date> {
    let mut out = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current {
        if day > end {
            break;
        }
        out.push(day);
        current = day.next_day();
    }
    out
}

/// Today's date on the local wall clock, or `None` when the local offset cannot be determined
/// (multi-threaded processes on some platforms).
pub fn today_local() -> Option<Date> {
    OffsetDateTime::now_local().ok().map(OffsetDateTime::date)
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Serde adapter that stores a [`Date`] as a `YYYY-MM-DD` string.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}
