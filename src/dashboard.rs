use crate::{
    Error, Result,
    chart::{
        comparison::ComparisonEvent,
        kind::ChartKind,
        render::{ChartRenderer, ChartSurface, RenderOutcome, RenderPlan},
        stats::{HistoricalChanges, last_update_label},
        store::ChartDataStore,
        theme::Theme,
        timeframe::Timeframe,
    },
    client::DashboardBackend,
    config::{DashboardConfig, LlmQueryKind},
    models::{IndicatorSummary, LlmPrompt},
    operation::{OperationGuard, OperationState},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use ustr::Ustr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOutcome {
    Loaded { slug: Ustr, render: RenderOutcome },
    /// Every candidate failed; the chart shows the empty state.
    Empty,
    /// A newer load started while this one was in flight.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddOutcome {
    Added { index: usize, render: RenderOutcome },
    /// The primary indicator changed while the comparison was being fetched.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub title: String,
    pub slug: Ustr,
    pub visible: bool,
    pub points: usize,
}

/// Read-only view of a dashboard for the embedding UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub id: String,
    pub primary: Option<SeriesSummary>,
    pub comparisons: Vec<SeriesSummary>,
    pub timeframe: Timeframe,
    pub theme: Theme,
    pub chart_kind: ChartKind,
    pub has_chart: bool,
}

struct DashboardState<S> {
    store: ChartDataStore,
    theme: Theme,
    kind: ChartKind,
    renderer: ChartRenderer<S>,
}

impl<S: ChartSurface> DashboardState<S> {
    fn render(&mut self) -> Result<RenderOutcome> {
        self.renderer.render(&self.store, self.theme, self.kind)
    }
}

/// One dashboard widget: fetches through `B`, draws onto `S`.
///
/// Every mutation re-renders under the same lock, so the surface never
/// shows a half-applied change.
pub struct Dashboard<B, S> {
    id: String,
    config: DashboardConfig,
    backend: B,
    state: Mutex<DashboardState<S>>,
    generation: AtomicU64,
    compare_guard: OperationGuard,
    llm_guard: OperationGuard,
}

impl<B, S> std::fmt::Debug for Dashboard<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("id", &self.id)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<B, S> Dashboard<B, S>
where
    B: DashboardBackend,
    S: ChartSurface + Send,
{
    pub fn new(id: impl Into<String>, config: DashboardConfig, backend: B, surface: S) -> Self {
        let store = ChartDataStore::new(config.max_comparisons, config.initial_timeframe());
        Self {
            id: id.into(),
            state: Mutex::new(DashboardState {
                store,
                theme: config.theme,
                kind: ChartKind::default(),
                renderer: ChartRenderer::new(surface),
            }),
            config,
            backend,
            generation: AtomicU64::new(0),
            compare_guard: OperationGuard::new("comparison fetch"),
            llm_guard: OperationGuard::new("llm query"),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn compare_state(&self) -> OperationState {
        self.compare_guard.state()
    }

    pub fn llm_state(&self) -> OperationState {
        self.llm_guard.state()
    }

    /// Registers a callback for comparison membership and visibility changes.
    pub async fn subscribe_comparisons(
        &self,
        f: impl Fn(ComparisonEvent) + Send + Sync + 'static,
    ) {
        self.state.lock().await.store.comparisons_mut().subscribe(f);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Loads the configured default indicator, falling back through the
    /// catalog in order.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn load_default_indicator(&self) -> Result<LoadOutcome> {
        let candidates = self.config.indicators.candidates(self.config.default_indicator);
        self.load_candidates(candidates).await
    }

    /// Loads `slug` as the primary indicator. If it has no usable data the
    /// other catalog indicators are tried before giving up.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn load_indicator(&self, slug: Ustr) -> Result<LoadOutcome> {
        let candidates = self.config.indicators.candidates(Some(slug));
        self.load_candidates(candidates).await
    }

    async fn load_candidates(&self, candidates: Vec<Ustr>) -> Result<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        for slug in candidates {
            let series = match self.backend.fetch_indicator(slug).await {
                Ok(series) => series,
                Err(e) => {
                    warn!("could not load {}: {}", slug, e);
                    if !self.is_current(generation) {
                        return Ok(LoadOutcome::Superseded);
                    }
                    continue;
                }
            };

            let mut state = self.state.lock().await;
            if !self.is_current(generation) {
                debug!("discarding stale response for {}", slug);
                return Ok(LoadOutcome::Superseded);
            }
            state.store.set_primary(series);
            let render = state.render().inspect_err(|e| {
                error!("loaded {} but could not draw it: {}", slug, e);
            })?;
            info!("primary indicator is now {}", slug);
            return Ok(LoadOutcome::Loaded { slug, render });
        }

        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            return Ok(LoadOutcome::Superseded);
        }
        error!("no indicator could be loaded, showing empty state");
        state.store.clear_primary();
        state.renderer.teardown();
        Ok(LoadOutcome::Empty)
    }

    /// Fetches `slug` and overlays it on the chart. Capacity is checked
    /// before the request is sent.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn add_comparison(&self, slug: Ustr) -> Result<AddOutcome> {
        let ticket = self.compare_guard.try_begin()?;
        let result = self.fetch_comparison(slug).await;
        ticket.finish(&result);
        result
    }

    async fn fetch_comparison(&self, slug: Ustr) -> Result<AddOutcome> {
        let (generation, epoch) = {
            let state = self.state.lock().await;
            if state.store.primary().is_none() {
                return Err(Error::NoPrimarySeries);
            }
            let comparisons = state.store.comparisons();
            if comparisons.is_full() {
                warn!("comparison limit of {} reached", comparisons.max());
                return Err(Error::CapacityExceeded {
                    max: comparisons.max(),
                });
            }
            (
                self.generation.load(Ordering::SeqCst),
                state.store.primary_epoch(),
            )
        };

        let series = self.backend.fetch_indicator(slug).await?;

        let mut state = self.state.lock().await;
        if !self.is_current(generation) || state.store.primary_epoch() != epoch {
            debug!("primary changed while fetching comparison {}", slug);
            return Ok(AddOutcome::Superseded);
        }
        let index = state.store.add_comparison(series)?;
        let render = state.render()?;
        info!("added comparison {} at {}", slug, index);
        Ok(AddOutcome::Added { index, render })
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn remove_comparison(&self, index: usize) -> Result<RenderOutcome> {
        let mut state = self.state.lock().await;
        let removed = state.store.comparisons_mut().remove(index)?;
        debug!("removed comparison {}", removed.slug);
        state.render()
    }

    /// Flips a comparison's visibility and returns the new flag.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn toggle_comparison(&self, index: usize) -> Result<bool> {
        let mut state = self.state.lock().await;
        let visible = state.store.comparisons_mut().toggle_visible(index)?;
        state.render()?;
        Ok(visible)
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn set_timeframe(&self, timeframe: Timeframe) -> Result<RenderOutcome> {
        let mut state = self.state.lock().await;
        state.store.set_timeframe(timeframe);
        state.render()
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn set_theme(&self, theme: Theme) -> Result<RenderOutcome> {
        let mut state = self.state.lock().await;
        state.theme = theme;
        state.render()
    }

    pub async fn toggle_theme(&self) -> Result<Theme> {
        let mut state = self.state.lock().await;
        state.theme = state.theme.toggled();
        state.render()?;
        Ok(state.theme)
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn set_chart_kind(&self, kind: ChartKind) -> Result<RenderOutcome> {
        let mut state = self.state.lock().await;
        state.kind = kind;
        state.render()
    }

    /// Redraws the current state, e.g. after the host resized the surface.
    pub async fn refresh(&self) -> Result<RenderOutcome> {
        self.state.lock().await.render()
    }

    /// Sends an analysis or news prompt. The kind must be switched on in
    /// the LLM config. Analysis and news share one control, so a second
    /// query while one is pending is rejected.
    #[tracing::instrument(skip(self, prompt), fields(id = %self.id))]
    pub async fn run_llm_query(&self, kind: LlmQueryKind, prompt: &LlmPrompt) -> Result<String> {
        if !self.config.llm.allows(kind) {
            warn!("{} query requested but it is disabled", kind);
            return Err(Error::LlmUnavailable(kind));
        }
        let ticket = self.llm_guard.try_begin()?;
        let has_primary = self.state.lock().await.store.primary().is_some();
        let result = if has_primary {
            self.backend.query_llm(prompt).await
        } else {
            Err(Error::NoPrimarySeries)
        };
        if let Err(e) = &result {
            warn!("llm query failed: {}", e);
        }
        ticket.finish(&result);
        result
    }

    /// Catalog matches for the search box.
    pub fn search(&self, query: &str) -> Vec<IndicatorSummary> {
        self.config
            .indicators
            .search(query, self.config.search_limit, self.config.min_query_len)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 3/6/12-month changes of the primary's current window as of `now`.
    pub async fn historical_changes(&self, now: DateTime<Utc>) -> HistoricalChanges {
        let state = self.state.lock().await;
        match state.store.primary() {
            Some(primary) => HistoricalChanges::compute(primary.current(), now),
            None => HistoricalChanges::default(),
        }
    }

    pub async fn last_update_label(&self, now: DateTime<Utc>) -> Option<String> {
        let state = self.state.lock().await;
        state
            .store
            .primary()
            .and_then(|primary| primary.last_update())
            .map(|updated| last_update_label(updated, now))
    }

    pub async fn render_plan(&self) -> Option<RenderPlan> {
        self.state.lock().await.renderer.last_plan().cloned()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.lock().await;
        let summary = |series: &crate::models::NamedSeries| SeriesSummary {
            title: series.title.clone(),
            slug: series.slug,
            visible: series.is_visible(),
            points: series.current().len(),
        };
        DashboardSnapshot {
            id: self.id.clone(),
            primary: state.store.primary().map(summary),
            comparisons: state.store.comparisons().iter().map(summary).collect(),
            timeframe: state.store.timeframe(),
            theme: state.theme,
            chart_kind: state.kind,
            has_chart: state.renderer.has_chart(),
        }
    }

    /// Releases the surface and invalidates any load still in flight.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.renderer.teardown();
        info!("dashboard torn down");
    }
}
