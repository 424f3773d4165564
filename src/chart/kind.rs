use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

/// Per-dataset drawing options for a chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStyle {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub tension: f64,
    pub fill: bool,
    pub point_radius: u8,
    pub point_hover_radius: u8,
}

impl ChartKind {
    pub fn style(self) -> ChartStyle {
        match self {
            ChartKind::Line => ChartStyle {
                kind: self,
                tension: 0.3,
                fill: false,
                point_radius: 0,
                point_hover_radius: 6,
            },
            ChartKind::Bar => ChartStyle {
                kind: self,
                tension: 0.0,
                fill: true,
                point_radius: 0,
                point_hover_radius: 0,
            },
        }
    }
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line"),
            ChartKind::Bar => write!(f, "bar"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to a line chart.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "bar" => ChartKind::Bar,
            _ => ChartKind::Line,
        })
    }
}
