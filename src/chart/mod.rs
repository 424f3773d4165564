pub mod comparison;
pub mod kind;
pub mod render;
pub mod stats;
pub mod store;
pub mod theme;
pub mod timeframe;

pub use comparison::{ComparisonEvent, ComparisonSet, DEFAULT_MAX_COMPARISONS};
pub use kind::{ChartKind, ChartStyle};
pub use render::{ChartRenderer, ChartSurface, Dataset, RenderOutcome, RenderPlan, YRange};
pub use stats::{HistoricalChanges, PercentChange, last_update_label};
pub use store::ChartDataStore;
pub use theme::{Color, Theme, ThemeColors, series_color};
pub use timeframe::Timeframe;
