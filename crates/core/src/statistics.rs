//! Bucketing helpers for the statistics endpoints.
//!
//! Repositories return sparse `(key, count)` rows from `GROUP BY` queries;
//! the helpers here expand them into dense maps so every known code (or
//! every month) appears in the response, with zero where nothing matched.

use std::collections::BTreeMap;

use serde::Serialize;

/// Expand sparse `(code, count)` rows into a map with an entry for every
/// code in `known`. Codes outside `known` are kept as well.
pub fn zero_filled(known: &[i32], rows: &[(i32, i64)]) -> BTreeMap<String, i64> {
    let mut out: BTreeMap<String, i64> = known.iter().map(|c| (c.to_string(), 0)).collect();
    for (code, count) in rows {
        *out.entry(code.to_string()).or_insert(0) += count;
    }
    out
}

/// Expand sparse `(month, count)` rows (month 1..=12) into `"01"`..`"12"`.
pub fn month_buckets(rows: &[(i32, i64)]) -> BTreeMap<String, i64> {
    let mut out: BTreeMap<String, i64> = (1..=12).map(|m| (format!("{m:02}"), 0)).collect();
    for (month, count) in rows {
        if (1..=12).contains(month) {
            *out.entry(format!("{month:02}")).or_insert(0) += count;
        }
    }
    out
}

/// `part / total`, rounded to four decimal places. Zero when `total` is zero.
pub fn rate(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 10_000.0
}

/// Equipment battery distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStats {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub no_data: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_filled_includes_every_known_code() {
        let map = zero_filled(&[0, 1, 2, 99], &[(1, 4), (99, 2)]);
        assert_eq!(map.len(), 4);
        assert_eq!(map["0"], 0);
        assert_eq!(map["1"], 4);
        assert_eq!(map["2"], 0);
        assert_eq!(map["99"], 2);
    }

    #[test]
    fn zero_filled_keeps_unexpected_codes() {
        let map = zero_filled(&[0], &[(7, 1)]);
        assert_eq!(map["7"], 1);
    }

    #[test]
    fn month_buckets_are_two_digit_and_complete() {
        let map = month_buckets(&[(3, 5), (12, 1), (13, 9)]);
        assert_eq!(map.len(), 12);
        assert_eq!(map["03"], 5);
        assert_eq!(map["12"], 1);
        assert_eq!(map["01"], 0);
        assert!(!map.contains_key("13"));
    }

    #[test]
    fn rate_handles_empty_total() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 3), 0.3333);
        assert_eq!(rate(2, 2), 1.0);
    }
}
