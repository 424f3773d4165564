use crate::{
    chart::{comparison::ComparisonSet, timeframe::Timeframe},
    models::NamedSeries,
};

/// Everything the chart plots: the primary series, its comparisons and the
/// active window.
#[derive(Debug, Clone, Default)]
pub struct ChartDataStore {
    primary: Option<NamedSeries>,
    comparisons: ComparisonSet,
    timeframe: Timeframe,
    primary_epoch: u64,
}

impl ChartDataStore {
    pub fn new(max_comparisons: usize, timeframe: Timeframe) -> Self {
        Self {
            primary: None,
            comparisons: ComparisonSet::new(max_comparisons),
            timeframe,
            primary_epoch: 0,
        }
    }

    pub fn primary(&self) -> Option<&NamedSeries> {
        self.primary.as_ref()
    }

    pub fn comparisons(&self) -> &ComparisonSet {
        &self.comparisons
    }

    pub fn comparisons_mut(&mut self) -> &mut ComparisonSet {
        &mut self.comparisons
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Bumped every time the primary is replaced or cleared.
    pub fn primary_epoch(&self) -> u64 {
        self.primary_epoch
    }

    /// Replaces the primary series, filtered to the active window. Existing
    /// comparisons belong to the old indicator and are cleared.
    pub fn set_primary(&mut self, mut series: NamedSeries) {
        series.apply_timeframe(&self.timeframe);
        tracing::debug!(
            "primary set to {} ({} of {} points in window)",
            series.slug,
            series.current().len(),
            series.full().len()
        );
        self.primary = Some(series);
        self.primary_epoch += 1;
        self.comparisons.clear();
    }

    pub fn clear_primary(&mut self) {
        self.primary = None;
        self.primary_epoch += 1;
        self.comparisons.clear();
    }

    /// Filters `series` to the active window and appends it as a comparison.
    pub fn add_comparison(&mut self, mut series: NamedSeries) -> crate::Result<usize> {
        series.apply_timeframe(&self.timeframe);
        self.comparisons.add(series)
    }

    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
        if let Some(primary) = self.primary.as_mut() {
            primary.apply_timeframe(&timeframe);
        }
        self.comparisons.apply_timeframe(&timeframe);
    }
}
