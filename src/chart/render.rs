use crate::{
    Result,
    chart::{
        kind::{ChartKind, ChartStyle},
        store::ChartDataStore,
        theme::{Color, Theme, ThemeColors, series_color},
        timeframe::Timeframe,
    },
    models::{NamedSeries, SeriesIterable, SeriesPoint},
};
use serde::Serialize;
use ustr::Ustr;

const RANGE_PADDING: f64 = 0.08;
const MAGNITUDE_PADDING: f64 = 0.02;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct YRange {
    pub min: f64,
    pub max: f64,
}

impl YRange {
    /// Shared axis range over `values` with NaN dropped. The padding is the
    /// larger of 8% of the spread and 2% of the maximum's magnitude, so a
    /// flat non-zero series still gets a non-empty range.
    pub fn padded(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return YRange::default();
        }
        let padding = (RANGE_PADDING * (max - min)).max(MAGNITUDE_PADDING * max.abs());
        YRange {
            min: min - padding,
            max: max + padding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub slug: Ustr,
    pub data: Vec<SeriesPoint>,
    pub border_color: Color,
    pub background_color: String,
    pub border_width: u8,
    #[serde(flatten)]
    pub style: ChartStyle,
}

impl Dataset {
    fn new(series: &NamedSeries, color_index: usize, kind: ChartKind, theme: Theme) -> Self {
        let border_color = series_color(color_index, theme);
        let background_color = if kind == ChartKind::Bar {
            theme.colors().bar_bg.to_string()
        } else {
            border_color.translucent()
        };
        Self {
            label: series.title.clone(),
            slug: series.slug,
            data: series.current().to_vec(),
            border_color,
            background_color,
            border_width: 3,
            style: kind.style(),
        }
    }
}

/// Everything a surface needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub title: String,
    pub kind: ChartKind,
    pub theme: Theme,
    pub colors: ThemeColors,
    pub timeframe: Timeframe,
    pub y_range: YRange,
    pub datasets: Vec<Dataset>,
    pub show_legend: bool,
}

impl RenderPlan {
    /// `None` when there is no primary series or its window is empty.
    pub fn build(store: &ChartDataStore, theme: Theme, kind: ChartKind) -> Option<Self> {
        let primary = store.primary().filter(|p| !p.current().is_empty())?;
        let comparisons = store.comparisons();

        let y_range = YRange::padded(
            primary.numeric_values().chain(
                comparisons
                    .visible_series()
                    .flat_map(|series| series.numeric_values()),
            ),
        );

        let mut datasets = vec![Dataset::new(primary, 0, kind, theme)];
        datasets.extend(
            comparisons
                .visible_positions()
                .map(|(position, series)| Dataset::new(series, position + 1, ChartKind::Line, theme)),
        );

        Some(Self {
            title: primary.title.clone(),
            kind,
            theme,
            colors: *theme.colors(),
            timeframe: store.timeframe(),
            y_range,
            show_legend: datasets.len() > 1,
            datasets,
        })
    }
}

/// Drawing target owned by a renderer, e.g. a canvas bridge.
pub trait ChartSurface {
    fn draw(&mut self, plan: &RenderPlan) -> Result<()>;
    /// Releases whatever the last `draw` created.
    fn clear(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutcome {
    Rendered { datasets: usize, y_range: YRange },
    NoData,
}

#[derive(Debug)]
pub struct ChartRenderer<S> {
    surface: S,
    last_plan: Option<RenderPlan>,
}

impl<S: ChartSurface> ChartRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            last_plan: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn last_plan(&self) -> Option<&RenderPlan> {
        self.last_plan.as_ref()
    }

    pub fn has_chart(&self) -> bool {
        self.last_plan.is_some()
    }

    /// Tears the current chart down, then draws a fresh one from `store`.
    /// On failure the surface is left empty, never half drawn.
    pub fn render(
        &mut self,
        store: &ChartDataStore,
        theme: Theme,
        kind: ChartKind,
    ) -> Result<RenderOutcome> {
        let plan = RenderPlan::build(store, theme, kind);
        self.teardown();

        let Some(plan) = plan else {
            tracing::debug!("nothing to plot, showing no-data state");
            return Ok(RenderOutcome::NoData);
        };

        if let Err(e) = self.surface.draw(&plan) {
            tracing::error!("chart surface failed to draw: {}", e);
            self.surface.clear();
            return Err(e);
        }

        let outcome = RenderOutcome::Rendered {
            datasets: plan.datasets.len(),
            y_range: plan.y_range,
        };
        tracing::debug!("rendered {:?}", outcome);
        self.last_plan = Some(plan);
        Ok(outcome)
    }

    pub fn teardown(&mut self) {
        if self.last_plan.take().is_some() {
            self.surface.clear();
        }
    }
}
