use crate::models::SeriesPoint;
use chrono::{DateTime, Months, Utc};
use serde::{Serialize, Serializer};
use std::fmt::Display;

pub const PLACEHOLDER: &str = "--";
pub const UP_COLOR: &str = "#4CAF50";
pub const DOWN_COLOR: &str = "#F44336";

/// Percentage change against an earlier point, or nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PercentChange {
    Value(f64),
    #[default]
    Unavailable,
}

impl PercentChange {
    /// `(latest - reference) / |reference| * 100`. Zero or NaN references and
    /// non-finite results are unavailable rather than `Infinity`/`NaN`.
    pub fn between(latest: f64, reference: f64) -> Self {
        if reference == 0.0 || reference.is_nan() || latest.is_nan() {
            return PercentChange::Unavailable;
        }
        let change = (latest - reference) / reference.abs() * 100.0;
        if change.is_finite() {
            PercentChange::Value(change)
        } else {
            PercentChange::Unavailable
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PercentChange::Value(v) => Some(*v),
            PercentChange::Unavailable => None,
        }
    }

    pub fn color(&self) -> Option<&'static str> {
        self.value()
            .map(|v| if v >= 0.0 { UP_COLOR } else { DOWN_COLOR })
    }
}

impl Display for PercentChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PercentChange::Value(v) if *v >= 0.0 => write!(f, "+{v:.2}%"),
            PercentChange::Value(v) => write!(f, "{v:.2}%"),
            PercentChange::Unavailable => write!(f, "{PLACEHOLDER}"),
        }
    }
}

impl Serialize for PercentChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalChanges {
    pub three_months: PercentChange,
    pub six_months: PercentChange,
    pub one_year: PercentChange,
}

impl HistoricalChanges {
    /// Changes of the latest point in `window` against the points nearest to
    /// 3, 6 and 12 months before `now`. Each target is taken from `now`
    /// on its own.
    pub fn compute(window: &[SeriesPoint], now: DateTime<Utc>) -> Self {
        let Some(latest) = window.last() else {
            return Self::default();
        };
        let change_over = |months: u32| {
            now.checked_sub_months(Months::new(months))
                .and_then(|target| nearest_point(window, target))
                .map_or(PercentChange::Unavailable, |found| {
                    PercentChange::between(latest.value, found.value)
                })
        };
        Self {
            three_months: change_over(3),
            six_months: change_over(6),
            one_year: change_over(12),
        }
    }
}

/// Point closest in time to `target`; the earliest one wins a tie.
pub fn nearest_point(points: &[SeriesPoint], target: DateTime<Utc>) -> Option<&SeriesPoint> {
    let mut best: Option<(&SeriesPoint, i64)> = None;
    for point in points {
        let distance = (point.timestamp - target).num_milliseconds().abs();
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((point, distance)),
        }
    }
    best.map(|(point, _)| point)
}

/// "Last updated" caption for a backend timestamp.
pub fn last_update_label(updated: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let elapsed = (now - updated).num_milliseconds().abs();
    let days = (elapsed + DAY_MS - 1) / DAY_MS;
    match days {
        1 => "Last updated: Yesterday".to_string(),
        d if d < 7 => format!("Last updated: {d} days ago"),
        _ => format!("Last updated: {}", updated.format("%Y-%m-%d")),
    }
}
