use crate::{
    Error, Result,
    chart::{comparison::DEFAULT_MAX_COMPARISONS, theme::Theme, timeframe::Timeframe},
    client::retry::RetryPolicy,
    models::IndicatorCatalog,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use url::Url;
use ustr::Ustr;

pub const NONCE_ENV: &str = "ZC_DMT_NONCE";
pub const DEFAULT_DATA_ACTION: &str = "zc_dmt_get_data";
pub const DEFAULT_LLM_ACTION: &str = "zc_dmt_run_llm_query";

fn default_max_comparisons() -> usize {
    DEFAULT_MAX_COMPARISONS
}
fn default_search_limit() -> usize {
    20
}
fn default_min_query_len() -> usize {
    2
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_data_action() -> String {
    DEFAULT_DATA_ACTION.to_string()
}

fn lenient_theme<'de, D>(deserializer: D) -> std::result::Result<Theme, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|s| s.parse().unwrap_or_default()).unwrap_or_default())
}

/// The two LLM buttons a dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmQueryKind {
    Analysis,
    News,
}

impl std::fmt::Display for LlmQueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmQueryKind::Analysis => write!(f, "analysis"),
            LlmQueryKind::News => write!(f, "news"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, bon::Builder)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmConfig {
    #[builder(default)]
    pub enabled: bool,
    #[builder(default)]
    pub show_analysis: bool,
    #[builder(default)]
    pub show_news: bool,
    #[builder(into, default = DEFAULT_LLM_ACTION.to_string())]
    pub action: String,
    /// Total attempts per query, the first one included.
    #[builder(default = 3)]
    pub max_attempts: u32,
    #[builder(default = 1000)]
    pub base_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LlmConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_attempts(self.max_attempts)
            .base_delay(Duration::from_millis(self.base_delay_ms))
            .build()
    }

    pub fn analysis_available(&self) -> bool {
        self.enabled && self.show_analysis
    }

    pub fn news_available(&self) -> bool {
        self.enabled && self.show_news
    }

    pub fn allows(&self, kind: LlmQueryKind) -> bool {
        match kind {
            LlmQueryKind::Analysis => self.analysis_available(),
            LlmQueryKind::News => self.news_available(),
        }
    }
}

/// Settings for one dashboard, in the shape the plugin page emits them.
///
/// ```
/// use zestra::config::DashboardConfig;
///
/// let config = DashboardConfig::from_json(
///     r#"{"ajaxUrl": "https://example.com/wp-admin/admin-ajax.php", "nonce": "abc"}"#,
/// )
/// .unwrap();
/// assert_eq!(config.max_comparisons, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    pub ajax_url: Url,
    #[builder(into)]
    pub nonce: Option<String>,
    #[builder(into)]
    pub chart_nonce: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub indicators: IndicatorCatalog,
    #[serde(default)]
    #[builder(into)]
    pub default_indicator: Option<Ustr>,
    #[serde(default)]
    #[builder(into)]
    pub default_time_range: Option<String>,
    #[serde(default, deserialize_with = "lenient_theme")]
    #[builder(default)]
    pub theme: Theme,
    #[serde(default = "default_max_comparisons")]
    #[builder(default = default_max_comparisons())]
    pub max_comparisons: usize,
    #[serde(default = "default_search_limit")]
    #[builder(default = default_search_limit())]
    pub search_limit: usize,
    #[serde(default = "default_min_query_len")]
    #[builder(default = default_min_query_len())]
    pub min_query_len: usize,
    #[serde(default = "default_request_timeout_secs")]
    #[builder(default = default_request_timeout_secs())]
    pub request_timeout_secs: u64,
    #[serde(default = "default_data_action")]
    #[builder(into, default = default_data_action())]
    pub data_action: String,
    #[serde(default, rename = "llmConfig")]
    #[builder(default)]
    pub llm: LlmConfig,
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Chart nonce, then the generic nonce, then `ZC_DMT_NONCE`.
    pub fn resolve_nonce(&self) -> Result<String> {
        [self.chart_nonce.as_deref(), self.nonce.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
            .map(str::to_string)
            .or_else(|| std::env::var(NONCE_ENV).ok().filter(|n| !n.trim().is_empty()))
            .ok_or(Error::MissingNonce)
    }

    /// Configured default range, or five years when it is missing or invalid.
    pub fn initial_timeframe(&self) -> Timeframe {
        match self.default_time_range.as_deref() {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("ignoring default time range: {}", e);
                Timeframe::default()
            }),
            None => Timeframe::default(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
