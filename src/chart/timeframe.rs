use crate::{Error, Result, models::SeriesPoint};
use chrono::Months;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

lazy_static::lazy_static! {
    static ref TIMEFRAME_REGEX: Regex = Regex::new(r"^(?i)\s*(\d+(?:\.\d+)?)\s*([ym]?)\s*$").unwrap();
}

pub const DEFAULT_YEARS: f64 = 5.0;

/// Display window: a number of years back from the last point, or everything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timeframe {
    Years(f64),
    All,
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Years(DEFAULT_YEARS)
    }
}

impl Timeframe {
    pub fn years(years: f64) -> Result<Self> {
        if years.is_finite() && years > 0.0 {
            Ok(Timeframe::Years(years))
        } else {
            Err(Error::InvalidTimeframe(years.to_string()))
        }
    }

    /// `round(years * 12)`, `None` for `All`.
    pub fn months(&self) -> Option<u32> {
        match self {
            Timeframe::Years(years) => Some((years * 12.0).round().max(0.0) as u32),
            Timeframe::All => None,
        }
    }

    /// Suffix of `full` whose timestamps are at or after the last point's
    /// timestamp minus the window. The input is never modified.
    pub fn filter(&self, full: &[SeriesPoint]) -> Vec<SeriesPoint> {
        let Some(last) = full.last() else {
            return Vec::new();
        };
        let Some(months) = self.months() else {
            return full.to_vec();
        };
        let Some(start) = last.timestamp.checked_sub_months(Months::new(months)) else {
            return full.to_vec();
        };
        let from = full.partition_point(|p| p.timestamp < start);
        full[from..].to_vec()
    }

    /// Standard button set, in display order.
    pub fn presets() -> [(&'static str, Timeframe); 9] {
        [
            ("6M", Timeframe::Years(0.5)),
            ("1Y", Timeframe::Years(1.0)),
            ("2Y", Timeframe::Years(2.0)),
            ("3Y", Timeframe::Years(3.0)),
            ("5Y", Timeframe::Years(5.0)),
            ("10Y", Timeframe::Years(10.0)),
            ("15Y", Timeframe::Years(15.0)),
            ("20Y", Timeframe::Years(20.0)),
            ("All", Timeframe::All),
        ]
    }

    pub fn label(&self) -> String {
        match self {
            Timeframe::All => "All".to_string(),
            Timeframe::Years(years) if years.fract() == 0.0 => format!("{years}Y"),
            Timeframe::Years(_) => format!("{}M", self.months().unwrap_or_default()),
        }
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    /// Accepts `all`, bare years (`5`, `0.5`) and `<n>Y` / `<n>M`.
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Timeframe::All);
        }
        let captures = TIMEFRAME_REGEX
            .captures(s)
            .ok_or_else(|| Error::InvalidTimeframe(s.to_string()))?;
        let amount: f64 = captures[1]
            .parse()
            .map_err(|_| Error::InvalidTimeframe(s.to_string()))?;
        let years = match captures[2].to_ascii_lowercase().as_str() {
            "m" => amount / 12.0,
            _ => amount,
        };
        Timeframe::years(years).map_err(|_| Error::InvalidTimeframe(s.to_string()))
    }
}

impl Display for Timeframe {
    /// Button range form: `all` or the number of years.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::All => write!(f, "all"),
            Timeframe::Years(years) => write!(f, "{years}"),
        }
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
