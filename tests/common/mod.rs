#![allow(dead_code)]

use chrono::{Months, TimeZone, Utc};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};
use url::Url;
use zestra::{
    Error, Result,
    chart::{ChartSurface, RenderPlan},
    client::DashboardBackend,
    config::{DashboardConfig, LlmConfig},
    models::{IndicatorCatalog, IndicatorSummary, LlmPrompt, NamedSeries, SeriesPoint},
};
use ustr::{Ustr, ustr};

/// `count` monthly points starting Jan 2015, values 1.0, 2.0, ...
pub fn monthly(count: u32) -> Vec<SeriesPoint> {
    (0..count)
        .map(|i| {
            let ts = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap() + Months::new(i);
            SeriesPoint::new(ts, (i + 1) as f64)
        })
        .collect()
}

#[derive(Default)]
pub struct FakeBackend {
    series: Mutex<HashMap<Ustr, Vec<SeriesPoint>>>,
    broken: Mutex<HashSet<Ustr>>,
    delays: Mutex<HashMap<Ustr, Duration>>,
    calls: Mutex<Vec<Ustr>>,
    llm_delay: Mutex<Duration>,
    llm_prompts: Mutex<Vec<LlmPrompt>>,
}

impl FakeBackend {
    pub fn with(slugs: &[(&str, u32)]) -> Self {
        let backend = Self::default();
        for (slug, count) in slugs {
            backend.insert(slug, monthly(*count));
        }
        backend
    }

    pub fn insert(&self, slug: &str, points: Vec<SeriesPoint>) {
        self.series.lock().unwrap().insert(ustr(slug), points);
    }

    pub fn break_slug(&self, slug: &str) {
        self.broken.lock().unwrap().insert(ustr(slug));
    }

    pub fn delay(&self, slug: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(ustr(slug), delay);
    }

    pub fn delay_llm(&self, delay: Duration) {
        *self.llm_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> Vec<Ustr> {
        self.calls.lock().unwrap().clone()
    }

    pub fn llm_prompts(&self) -> Vec<LlmPrompt> {
        self.llm_prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DashboardBackend for FakeBackend {
    async fn fetch_indicator(&self, slug: Ustr) -> Result<NamedSeries> {
        self.calls.lock().unwrap().push(slug);
        let delay = self.delays.lock().unwrap().get(&slug).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.broken.lock().unwrap().contains(&slug) {
            return Err(Error::FetchFailure {
                slug,
                reason: "backend reported an error".to_string(),
            });
        }
        let points = self.series.lock().unwrap().get(&slug).cloned();
        match points {
            Some(points) if !points.is_empty() => Ok(NamedSeries::new(
                slug.to_uppercase(),
                slug,
                points,
            )
            .with_last_update(Some(Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap()))),
            _ => Err(Error::FetchFailure {
                slug,
                reason: "empty series".to_string(),
            }),
        }
    }

    async fn query_llm(&self, prompt: &LlmPrompt) -> Result<String> {
        self.llm_prompts.lock().unwrap().push(prompt.clone());
        let delay = *self.llm_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("answer to: {}", prompt.user_query))
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub live: bool,
    pub draws: usize,
    pub clears: usize,
    pub last_datasets: usize,
}

/// Surface whose log stays readable after the surface moves into a dashboard.
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    pub log: Arc<Mutex<SurfaceLog>>,
}

impl ChartSurface for FakeSurface {
    fn draw(&mut self, plan: &RenderPlan) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        assert!(!log.live, "drew over a live chart");
        log.live = true;
        log.draws += 1;
        log.last_datasets = plan.datasets.len();
        Ok(())
    }

    fn clear(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.live = false;
        log.clears += 1;
    }
}

pub fn config(default_indicator: Option<&str>, catalog: &[&str]) -> DashboardConfig {
    DashboardConfig::builder()
        .ajax_url(Url::parse("https://zestra.example/wp-admin/admin-ajax.php").unwrap())
        .nonce("test-nonce")
        .indicators(IndicatorCatalog::new(
            catalog
                .iter()
                .map(|slug| IndicatorSummary::new(slug.to_uppercase(), slug))
                .collect(),
        ))
        .maybe_default_indicator(default_indicator.map(ustr))
        .llm(
            LlmConfig::builder()
                .enabled(true)
                .show_analysis(true)
                .show_news(true)
                .build(),
        )
        .build()
}
