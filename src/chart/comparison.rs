use crate::{Error, Result, chart::timeframe::Timeframe, models::NamedSeries};
use std::sync::Arc;
use ustr::Ustr;

pub const DEFAULT_MAX_COMPARISONS: usize = 10;

pub type CallbackFn<T> = Box<dyn Fn(T) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonEvent {
    Added { index: usize, slug: Ustr },
    Removed { index: usize, slug: Ustr },
    VisibilityChanged { index: usize, visible: bool },
    Cleared,
}

/// Ordered, capped set of overlay series. Every membership or visibility
/// change is reported to the subscribers.
#[derive(Clone)]
pub struct ComparisonSet {
    items: Vec<NamedSeries>,
    max: usize,
    subscribers: Vec<Arc<CallbackFn<ComparisonEvent>>>,
}

impl std::fmt::Debug for ComparisonSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonSet")
            .field("items", &self.items)
            .field("max", &self.max)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for ComparisonSet {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMPARISONS)
    }
}

impl ComparisonSet {
    pub fn new(max: usize) -> Self {
        Self {
            items: Vec::new(),
            max,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, f: impl Fn(ComparisonEvent) + Send + Sync + 'static) {
        self.subscribers.push(Arc::new(Box::new(f)));
    }

    fn notify(&self, event: ComparisonEvent) {
        tracing::trace!("comparison event {:?}", event);
        for subscriber in &self.subscribers {
            subscriber(event);
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max
    }

    pub fn contains(&self, slug: Ustr) -> bool {
        self.items.iter().any(|item| item.slug == slug)
    }

    pub fn get(&self, index: usize) -> Option<&NamedSeries> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedSeries> {
        self.items.iter()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    /// Appends `series` as visible and returns its position.
    pub fn add(&mut self, mut series: NamedSeries) -> Result<usize> {
        if self.is_full() {
            tracing::warn!(
                "rejecting comparison {}: {} of {} slots used",
                series.slug,
                self.items.len(),
                self.max
            );
            return Err(Error::CapacityExceeded { max: self.max });
        }
        series.set_visible(true);
        let slug = series.slug;
        self.items.push(series);
        let index = self.items.len() - 1;
        self.notify(ComparisonEvent::Added { index, slug });
        Ok(index)
    }

    pub fn remove(&mut self, index: usize) -> Result<NamedSeries> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        self.notify(ComparisonEvent::Removed {
            index,
            slug: removed.slug,
        });
        Ok(removed)
    }

    /// Flips visibility and returns the new flag. Data is kept.
    pub fn toggle_visible(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let item = &mut self.items[index];
        let visible = !item.is_visible();
        item.set_visible(visible);
        self.notify(ComparisonEvent::VisibilityChanged { index, visible });
        Ok(visible)
    }

    /// Visible comparisons in insertion order. Clone the iterator to restart.
    pub fn visible_series(&self) -> impl Iterator<Item = &NamedSeries> + Clone + '_ {
        self.items.iter().filter(|item| item.is_visible())
    }

    /// Positions (in the full set) of the visible comparisons.
    pub fn visible_positions(&self) -> impl Iterator<Item = (usize, &NamedSeries)> + Clone + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_visible())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.notify(ComparisonEvent::Cleared);
    }

    pub fn apply_timeframe(&mut self, timeframe: &Timeframe) {
        for item in &mut self.items {
            item.apply_timeframe(timeframe);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesPoint;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn series(slug: &str) -> NamedSeries {
        let points = (1..=3)
            .map(|m| SeriesPoint::new(Utc.with_ymd_and_hms(2024, m, 1, 0, 0, 0).unwrap(), m as f64))
            .collect();
        NamedSeries::new(slug.to_uppercase(), ustr::ustr(slug), points)
    }

    fn recording(set: &mut ComparisonSet) -> Arc<Mutex<Vec<ComparisonEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        set.subscribe(move |event| sink.lock().unwrap().push(event));
        events
    }

    #[test]
    fn test_add_until_capacity() {
        let mut set = ComparisonSet::new(2);
        let events = recording(&mut set);
        assert_eq!(set.add(series("cpi")).unwrap(), 0);
        assert_eq!(set.add(series("gdp")).unwrap(), 1);

        let err = set.add(series("unrate")).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { max: 2 }));
        assert_eq!(set.len(), 2);
        assert!(!set.contains(ustr::ustr("unrate")));
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_single_slot_policy() {
        let mut set = ComparisonSet::new(1);
        set.add(series("cpi")).unwrap();
        assert!(set.is_full());
        assert!(set.add(series("gdp")).is_err());
    }

    #[test]
    fn test_remove() {
        let mut set = ComparisonSet::default();
        let events = recording(&mut set);
        set.add(series("cpi")).unwrap();
        set.add(series("gdp")).unwrap();

        let removed = set.remove(0).unwrap();
        assert_eq!(removed.slug.as_str(), "cpi");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().slug.as_str(), "gdp");
        assert_eq!(
            events.lock().unwrap().last().copied(),
            Some(ComparisonEvent::Removed {
                index: 0,
                slug: ustr::ustr("cpi")
            })
        );

        let err = set.remove(5).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut set = ComparisonSet::default();
        set.add(series("cpi")).unwrap();
        assert!(!set.toggle_visible(0).unwrap());
        assert!(!set.get(0).unwrap().is_visible());
        assert!(set.toggle_visible(0).unwrap());
        assert!(set.get(0).unwrap().is_visible());
        assert_eq!(set.get(0).unwrap().full().len(), 3);
        assert!(set.toggle_visible(1).is_err());
    }

    #[test]
    fn test_visible_series_restartable() {
        let mut set = ComparisonSet::default();
        set.add(series("cpi")).unwrap();
        set.add(series("gdp")).unwrap();
        set.add(series("unrate")).unwrap();
        set.toggle_visible(1).unwrap();

        let visible = set.visible_series();
        let first: Vec<&str> = visible.clone().map(|s| s.slug.as_str()).collect();
        let second: Vec<&str> = visible.map(|s| s.slug.as_str()).collect();
        assert_eq!(first, vec!["cpi", "unrate"]);
        assert_eq!(first, second);

        let positions: Vec<usize> = set.visible_positions().map(|(i, _)| i).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn test_clear_notifies() {
        let mut set = ComparisonSet::default();
        let events = recording(&mut set);
        set.add(series("cpi")).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(
            events.lock().unwrap().last().copied(),
            Some(ComparisonEvent::Cleared)
        );
    }

    #[test]
    fn test_apply_timeframe() {
        let mut set = ComparisonSet::default();
        set.add(series("cpi")).unwrap();
        set.apply_timeframe(&Timeframe::Years(1.0 / 12.0));
        assert_eq!(set.get(0).unwrap().current().len(), 2);
        set.apply_timeframe(&Timeframe::All);
        assert_eq!(set.get(0).unwrap().current().len(), 3);
    }
}
