mod chart_config;
mod hover_coordinator;
mod series_registry;
mod time_chart;

pub use chart_config::{SeriesRule, TimeChartConfig};
pub use hover_coordinator::{
    HOVER_SNAPSHOT_JSON_SCHEMA_V1, HoverContext, HoverCoordinator, HoverHit, HoverSelection,
    HoverSnapshot,
};
pub use series_registry::{SeriesEntry, SeriesRegistry, build_generator};
pub use time_chart::{ChartUpdate, TimeChart, padded_domain};
