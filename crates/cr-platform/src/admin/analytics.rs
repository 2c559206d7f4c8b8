//! Issue analytics.
//!
//! All aggregation happens in-process over the full issue dump; the row
//! store is only asked for rows, never for aggregates. Rows with missing or
//! unparseable fields are skipped, not errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Hotspot grid resolution: 3 decimal places, roughly a 110m cell.
const COORD_DECIMALS: f64 = 1000.0;

/// Maximum hotspot cells returned.
const HOTSPOT_LIMIT: usize = 20;

/// Issues created per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DateCount {
    pub date: String,
    pub count: u64,
}

/// Resolution latency over resolved issues in the window.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResponseTimes {
    /// Mean hours from creation to resolution; absent when nothing resolved.
    pub average_hours: Option<f64>,
    /// Number of resolved issues in the window.
    pub count: u64,
}

/// A geographic cluster of issues.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Hotspot {
    pub lat: f64,
    pub lon: f64,
    pub count: u64,
}

/// Parse the timestamp formats the row store emits: RFC 3339, a naive
/// datetime taken as UTC, or a bare date.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

fn field<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

/// Count issues per creation date over the trailing window.
pub fn issues_by_time(rows: &[Value], days: i64, now: DateTime<Utc>) -> Vec<DateCount> {
    let cutoff = now - chrono::Duration::days(days);
    let mut buckets: HashMap<String, u64> = HashMap::new();
    for row in rows {
        let Some(created) = field(row, "created_at").and_then(parse_timestamp) else {
            continue;
        };
        if created < cutoff {
            continue;
        }
        *buckets
            .entry(created.date_naive().to_string())
            .or_insert(0) += 1;
    }
    let mut counts: Vec<DateCount> = buckets
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect();
    counts.sort_by(|a, b| a.date.cmp(&b.date));
    counts
}

/// Mean creation-to-resolution latency over issues created in the window.
pub fn response_times(rows: &[Value], days: i64, now: DateTime<Utc>) -> ResponseTimes {
    let cutoff = now - chrono::Duration::days(days);
    let mut total_hours = 0.0;
    let mut resolved = 0u64;
    for row in rows {
        let Some(created) = field(row, "created_at").and_then(parse_timestamp) else {
            continue;
        };
        if created < cutoff {
            continue;
        }
        let Some(resolved_at) = field(row, "resolved_at").and_then(parse_timestamp) else {
            continue;
        };
        total_hours += (resolved_at - created).num_seconds() as f64 / 3600.0;
        resolved += 1;
    }
    ResponseTimes {
        average_hours: (resolved > 0).then(|| total_hours / resolved as f64),
        count: resolved,
    }
}

/// Cluster issues by rounded coordinates, most crowded cells first.
///
/// Locations are `"lat,lon"` strings; anything that fails to split or parse
/// is skipped.
pub fn hotspots(rows: &[Value]) -> Vec<Hotspot> {
    let mut cells: HashMap<(i64, i64), u64> = HashMap::new();
    for row in rows {
        let Some(location) = field(row, "location") else {
            continue;
        };
        let Some((lat_s, lon_s)) = location.split_once(',') else {
            continue;
        };
        let (Ok(lat), Ok(lon)) = (lat_s.trim().parse::<f64>(), lon_s.trim().parse::<f64>())
        else {
            continue;
        };
        let key = (
            (lat * COORD_DECIMALS).round() as i64,
            (lon * COORD_DECIMALS).round() as i64,
        );
        *cells.entry(key).or_insert(0) += 1;
    }
    let mut clusters: Vec<Hotspot> = cells
        .into_iter()
        .map(|((lat_key, lon_key), count)| Hotspot {
            lat: lat_key as f64 / COORD_DECIMALS,
            lon: lon_key as f64 / COORD_DECIMALS,
            count,
        })
        .collect();
    clusters.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.lat.partial_cmp(&b.lat).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.lon.partial_cmp(&b.lon).unwrap_or(std::cmp::Ordering::Equal))
    });
    clusters.truncate(HOTSPOT_LIMIT);
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn issues_by_time_buckets_and_sorts_by_date() {
        let rows = vec![
            json!({"created_at": "2024-06-14T08:00:00Z"}),
            json!({"created_at": "2024-06-14T18:30:00Z"}),
            json!({"created_at": "2024-06-12T09:00:00Z"}),
            json!({"created_at": "2024-05-01T09:00:00Z"}),
            json!({"title": "no timestamp"}),
        ];
        let counts = issues_by_time(&rows, 7, now());
        assert_eq!(
            counts,
            vec![
                DateCount { date: "2024-06-12".into(), count: 1 },
                DateCount { date: "2024-06-14".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn issues_by_time_accepts_naive_and_date_only_timestamps() {
        let rows = vec![
            json!({"created_at": "2024-06-14T08:00:00.123456"}),
            json!({"created_at": "2024-06-13"}),
        ];
        let counts = issues_by_time(&rows, 7, now());
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn response_times_averages_resolved_issues_only() {
        let rows = vec![
            json!({"created_at": "2024-06-10T00:00:00Z", "resolved_at": "2024-06-10T12:00:00Z"}),
            json!({"created_at": "2024-06-11T00:00:00Z", "resolved_at": "2024-06-12T00:00:00Z"}),
            json!({"created_at": "2024-06-12T00:00:00Z"}),
        ];
        let stats = response_times(&rows, 30, now());
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average_hours, Some(18.0));
    }

    #[test]
    fn response_times_serialize_with_the_count_field() {
        let stats = ResponseTimes {
            average_hours: Some(12.0),
            count: 3,
        };
        let body = serde_json::to_value(&stats).unwrap();
        assert_eq!(body, json!({"average_hours": 12.0, "count": 3}));
    }

    #[test]
    fn response_times_empty_window() {
        let stats = response_times(&[], 30, now());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average_hours, None);
    }

    #[test]
    fn hotspots_cluster_by_rounded_coordinates() {
        let rows = vec![
            json!({"location": "40.7128,-74.0060"}),
            json!({"location": "40.71281,-74.00603"}),
            json!({"location": "40.7500,-73.9900"}),
            json!({"location": "garbage"}),
            json!({"title": "no location"}),
        ];
        let clusters = hotspots(&rows);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].count, 2);
        assert_eq!(clusters[0].lat, 40.713);
        assert_eq!(clusters[0].lon, -74.006);
    }

    #[test]
    fn hotspots_caps_the_result() {
        let rows: Vec<Value> = (0..30)
            .map(|i| json!({"location": format!("{}.0,0.0", i)}))
            .collect();
        assert_eq!(hotspots(&rows).len(), 20);
    }
}
