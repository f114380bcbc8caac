//! Pagination and query-string helpers shared by list endpoints.
//!
//! The admin frontend sends every filter as a string and leaves unused
//! filters empty (`?status=&name=`), and some screens use `-1` for "all".
//! The deserializers here turn those conventions into plain `Option`s so
//! repositories only ever see real filter values.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::types::Timestamp;

/// Default page size when the client sends none.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A resolved `page` / `pageSize` pair. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: clamp_limit(page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Loosely-typed scalar as it arrives from either a query string or a JSON body.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

fn loose_text(value: Option<Loose>) -> Option<String> {
    match value? {
        Loose::Int(v) => Some(v.to_string()),
        Loose::Float(v) => Some(v.to_string()),
        Loose::Bool(v) => Some(v.to_string()),
        Loose::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

/// Deserialize an optional value, treating a missing, null or blank value as `None`.
///
/// Accepts both strings (`"3"`) and JSON numbers (`3`).
pub fn empty_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match loose_text(Option::<Loose>::deserialize(de)?) {
        None => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Like [`empty_as_none`] for enumerated code filters, where any negative
/// value (the UI uses `-1`) means "no filter".
pub fn code_filter<'de, D>(de: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_as_none::<D, i32>(de)?.filter(|code| *code >= 0))
}

/// Deserialize a required timestamp in any format [`parse_time_bound`] accepts.
pub fn flexible_timestamp<'de, D>(de: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(de)?;
    parse_time_bound(text.trim(), false)
        .ok_or_else(|| de::Error::custom(format!("invalid date or time: {text}")))
}

/// Deserialize an optional timestamp; blank means `None`.
pub fn optional_timestamp<'de, D>(de: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_as_none::<D, String>(de)? {
        None => Ok(None),
        Some(text) => parse_time_bound(&text, false)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date or time: {text}"))),
    }
}

/// Deserialize the lower bound of a time range.
pub fn start_bound<'de, D>(de: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_timestamp(de)
}

/// Deserialize the upper bound of a time range. A bare date covers the whole day.
pub fn end_bound<'de, D>(de: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_as_none::<D, String>(de)? {
        None => Ok(None),
        Some(text) => parse_time_bound(&text, true)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date or time: {text}"))),
    }
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`.
///
/// For a bare date, `end_of_day` selects the last instant of that day
/// instead of midnight.
pub fn parse_time_bound(text: &str, end_of_day: bool) -> Option<Timestamp> {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)?
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Filters {
        #[serde(default, deserialize_with = "empty_as_none")]
        page: Option<i64>,
        #[serde(default, deserialize_with = "code_filter")]
        status: Option<i32>,
        #[serde(default, deserialize_with = "start_bound")]
        from: Option<Timestamp>,
        #[serde(default, deserialize_with = "end_bound")]
        to: Option<Timestamp>,
    }

    #[test]
    fn page_defaults() {
        let page = PageRequest::default();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_offset_is_one_based() {
        let page = PageRequest::new(Some(3), Some(20));
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::new(None, Some(10_000)).limit(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest::new(Some(1), Some(1)));
    }

    #[test]
    fn blank_and_sentinel_values_mean_no_filter() {
        let f: Filters =
            serde_json::from_value(serde_json::json!({"page": "", "status": -1})).unwrap();
        assert_eq!(f.page, None);
        assert_eq!(f.status, None);
    }

    #[test]
    fn numeric_strings_and_numbers_both_parse() {
        let f: Filters =
            serde_json::from_value(serde_json::json!({"page": "2", "status": 1})).unwrap();
        assert_eq!(f.page, Some(2));
        assert_eq!(f.status, Some(1));
    }

    #[test]
    fn missing_fields_are_none() {
        let f: Filters = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(f.page.is_none() && f.from.is_none() && f.to.is_none());
    }

    #[test]
    fn garbage_number_is_rejected() {
        let result: Result<Filters, _> =
            serde_json::from_value(serde_json::json!({"page": "abc"}));
        assert!(result.is_err());
    }

    #[test]
    fn date_only_bounds_cover_the_whole_day() {
        let f: Filters = serde_json::from_value(
            serde_json::json!({"from": "2024-05-01", "to": "2024-05-01"}),
        )
        .unwrap();
        let from = f.from.unwrap();
        let to = f.to.unwrap();
        assert_eq!((from.day(), from.hour()), (1, 0));
        assert_eq!((to.day(), to.hour(), to.minute()), (1, 23, 59));
    }

    #[derive(Debug, Deserialize)]
    struct Event {
        #[serde(deserialize_with = "flexible_timestamp")]
        at: Timestamp,
    }

    #[test]
    fn required_timestamp_accepts_plain_dates() {
        let e: Event = serde_json::from_value(serde_json::json!({"at": "2024-03-02"})).unwrap();
        assert_eq!(e.at.month(), 3);
        assert!(serde_json::from_value::<Event>(serde_json::json!({})).is_err());
    }

    #[test]
    fn rfc3339_and_space_separated_times_parse() {
        let a = parse_time_bound("2024-05-01T08:30:00+02:00", false).unwrap();
        assert_eq!(a.hour(), 6);
        let b = parse_time_bound("2024-05-01 08:30:00", false).unwrap();
        assert_eq!(b.hour(), 8);
        assert!(parse_time_bound("yesterday", false).is_none());
    }
}
