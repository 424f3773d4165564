pub use crate::chart::{
    ChartDataStore, ChartKind, ChartRenderer, ChartSurface, ComparisonEvent, ComparisonSet,
    HistoricalChanges, PercentChange, RenderOutcome, RenderPlan, Theme, Timeframe, YRange,
};
pub use crate::client::{DashboardBackend, DashboardClient, RetryPolicy};
pub use crate::config::{DashboardConfig, LlmConfig, LlmQueryKind};
pub use crate::dashboard::{AddOutcome, Dashboard, DashboardSnapshot, LoadOutcome};
pub use crate::error::Error;
pub use crate::models::{
    IndicatorCatalog, IndicatorSummary, LlmPrompt, NamedSeries, SeriesIterable, SeriesPoint,
};
pub use crate::operation::{OperationGuard, OperationState};
pub use crate::registry::DashboardRegistry;
pub use crate::Result;

// Re-exporting some commonly used types
pub use async_trait::async_trait;
pub use ustr::{Ustr, ustr};
