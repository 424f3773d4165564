pub use self::catalog::*;
pub use self::wire::*;

use crate::chart::timeframe::Timeframe;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use ustr::Ustr;

pub mod catalog;
pub mod wire;

/// One observation of an indicator. Serialises as `{x, y}`, the shape the
/// charting surface plots directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(rename = "x")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "y")]
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair(RawTimestamp, Option<RawValue>),
    Object { x: RawTimestamp, y: Option<RawValue> },
}

impl RawTimestamp {
    fn resolve(self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms),
            RawTimestamp::Float(ms) if ms.is_finite() => DateTime::from_timestamp_millis(ms as i64),
            RawTimestamp::Float(_) => None,
            RawTimestamp::Text(text) => parse_timestamp(&text),
        }
    }
}

impl RawValue {
    /// Anything that is not a finite number, `inf` included, becomes NaN.
    fn resolve(value: Option<Self>) -> f64 {
        let parsed = match value {
            Some(RawValue::Number(n)) => Some(n),
            Some(RawValue::Text(text)) => text.trim().parse::<f64>().ok(),
            None => None,
        };
        parsed.filter(|v| v.is_finite()).unwrap_or(f64::NAN)
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 and `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

impl<'de> Deserialize<'de> for SeriesPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (timestamp, value) = match RawPoint::deserialize(deserializer)? {
            RawPoint::Pair(t, v) => (t, v),
            RawPoint::Object { x, y } => (x, y),
        };
        let timestamp = timestamp
            .resolve()
            .ok_or_else(|| serde::de::Error::custom("unrecognised series timestamp"))?;
        Ok(SeriesPoint {
            timestamp,
            value: RawValue::resolve(value),
        })
    }
}

/// Sorts ascending by timestamp and keeps the last value seen for a
/// duplicated timestamp.
pub fn normalize_series(mut points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    points.sort_by_key(|p| p.timestamp);
    points.dedup_by(|later, earlier| {
        if later.timestamp == earlier.timestamp {
            *earlier = *later;
            true
        } else {
            false
        }
    });
    points
}

pub trait SeriesIterable {
    fn points(&self) -> impl Iterator<Item = &SeriesPoint> + '_;

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points().map(|p| p.value)
    }

    fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points().map(|p| p.timestamp)
    }

    /// Values with NaN dropped.
    fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values().filter(|v| !v.is_nan())
    }
}

impl SeriesIterable for [SeriesPoint] {
    fn points(&self) -> impl Iterator<Item = &SeriesPoint> + '_ {
        self.iter()
    }
}

impl SeriesIterable for NamedSeries {
    fn points(&self) -> impl Iterator<Item = &SeriesPoint> + '_ {
        self.current.iter()
    }
}

/// An indicator held by the chart store: the immutable fetched series plus
/// the window currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub title: String,
    pub slug: Ustr,
    full: Arc<[SeriesPoint]>,
    current: Vec<SeriesPoint>,
    visible: bool,
    last_update: Option<DateTime<Utc>>,
}

impl NamedSeries {
    pub fn new(title: impl Into<String>, slug: Ustr, full: Vec<SeriesPoint>) -> Self {
        let full: Arc<[SeriesPoint]> = normalize_series(full).into();
        Self {
            title: title.into(),
            slug,
            current: full.to_vec(),
            full,
            visible: true,
            last_update: None,
        }
    }

    pub fn with_last_update(mut self, last_update: Option<DateTime<Utc>>) -> Self {
        self.last_update = last_update;
        self
    }

    pub fn full(&self) -> &[SeriesPoint] {
        &self.full
    }

    pub fn current(&self) -> &[SeriesPoint] {
        &self.current
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.current.last()
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Recomputes `current` from `full`; `full` is never touched.
    pub fn apply_timeframe(&mut self, timeframe: &Timeframe) {
        self.current = timeframe.filter(&self.full);
    }
}

impl From<IndicatorData> for NamedSeries {
    fn from(data: IndicatorData) -> Self {
        let title = if data.indicator.name.is_empty() {
            data.indicator.slug.to_string()
        } else {
            data.indicator.name
        };
        NamedSeries::new(title, data.indicator.slug, data.series).with_last_update(data.last_update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_point_from_pair() {
        let point: SeriesPoint = serde_json::from_str(r#"["2024-03-01", 12.5]"#).unwrap();
        assert_eq!(point.timestamp, day(2024, 3, 1));
        assert_eq!(point.value, 12.5);

        let point: SeriesPoint = serde_json::from_str(r#"[1709251200000, "7.25"]"#).unwrap();
        assert_eq!(point.timestamp, day(2024, 3, 1));
        assert_eq!(point.value, 7.25);
    }

    #[test]
    fn test_point_non_numeric_value_is_nan() {
        let point: SeriesPoint = serde_json::from_str(r#"["2024-03-01", null]"#).unwrap();
        assert!(point.value.is_nan());
        let point: SeriesPoint = serde_json::from_str(r#"["2024-03-01", "n/a"]"#).unwrap();
        assert!(point.value.is_nan());
    }

    #[test]
    fn test_point_infinite_text_is_nan() {
        for raw in ["inf", "-inf", "Infinity", "-Infinity", "NaN"] {
            let json = format!(r#"["2024-03-01", "{raw}"]"#);
            let point: SeriesPoint = serde_json::from_str(&json).unwrap();
            assert!(point.value.is_nan(), "{raw} gave {}", point.value);
        }
    }

    #[test]
    fn test_point_from_object_and_rfc3339() {
        let point: SeriesPoint =
            serde_json::from_str(r#"{"x": "2024-03-01T00:00:00Z", "y": 3}"#).unwrap();
        assert_eq!(point.timestamp, day(2024, 3, 1));
        assert_eq!(point.value, 3.0);
    }

    #[test]
    fn test_point_bad_timestamp() {
        assert!(serde_json::from_str::<SeriesPoint>(r#"["yesterday", 1]"#).is_err());
    }

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let points = vec![
            SeriesPoint::new(day(2024, 3, 1), 3.0),
            SeriesPoint::new(day(2024, 1, 1), 1.0),
            SeriesPoint::new(day(2024, 2, 1), 2.0),
            SeriesPoint::new(day(2024, 1, 1), 1.5),
        ];
        let normalized = normalize_series(points);
        let values: Vec<f64> = normalized.values().collect();
        assert_eq!(values, vec![1.5, 2.0, 3.0]);
    }

    #[test]
    fn test_apply_timeframe_keeps_full() {
        let points = (1..=12)
            .map(|m| SeriesPoint::new(day(2023, m, 1), m as f64))
            .collect();
        let mut series = NamedSeries::new("GDP", ustr::ustr("gdp"), points);
        series.apply_timeframe(&Timeframe::Years(0.25));
        assert_eq!(series.full().len(), 12);
        assert_eq!(series.current().len(), 4);
        assert_eq!(series.latest().map(|p| p.value), Some(12.0));
    }
}
