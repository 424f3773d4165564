use crate::{
    Result,
    chart::render::{ChartSurface, RenderOutcome},
    client::DashboardBackend,
    dashboard::Dashboard,
    utils::gen_dashboard_id,
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// Live dashboards keyed by container id, owned by the embedding app.
pub struct DashboardRegistry<B, S> {
    dashboards: DashMap<String, Arc<Dashboard<B, S>>>,
}

impl<B, S> Default for DashboardRegistry<B, S> {
    fn default() -> Self {
        Self {
            dashboards: DashMap::new(),
        }
    }
}

impl<B, S> std::fmt::Debug for DashboardRegistry<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.dashboards.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("DashboardRegistry").field("ids", &ids).finish()
    }
}

impl<B, S> DashboardRegistry<B, S>
where
    B: DashboardBackend,
    S: ChartSurface + Send,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing dashboard for `id`, or a new one from `create`. Without an
    /// id a fresh one is generated.
    pub fn get_or_create(
        &self,
        id: Option<&str>,
        create: impl FnOnce(&str) -> Dashboard<B, S>,
    ) -> Arc<Dashboard<B, S>> {
        let id = id.map_or_else(gen_dashboard_id, str::to_string);
        self.dashboards
            .entry(id.clone())
            .or_insert_with(|| {
                info!("creating dashboard {}", id);
                Arc::new(create(&id))
            })
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Dashboard<B, S>>> {
        self.dashboards.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.dashboards.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.dashboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dashboards.is_empty()
    }

    pub fn all(&self) -> Vec<Arc<Dashboard<B, S>>> {
        self.dashboards
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Removes and tears down the dashboard. Returns whether it existed.
    pub async fn destroy(&self, id: &str) -> bool {
        let Some((_, dashboard)) = self.dashboards.remove(id) else {
            return false;
        };
        dashboard.teardown().await;
        info!("destroyed dashboard {}", id);
        true
    }

    /// Redraws every dashboard, e.g. after a layout change.
    pub async fn refresh_all(&self) -> Vec<(String, Result<RenderOutcome>)> {
        let mut results = Vec::new();
        for dashboard in self.all() {
            let outcome = dashboard.refresh().await;
            results.push((dashboard.id().to_string(), outcome));
        }
        results
    }
}
