//! timechart-rs: charting core for streamed time series.
//!
//! Points are grouped into series, each series is drawn by a generator
//! (line, time bars or event markers), and a hover coordinator keeps
//! highlights and the tooltip in step with the pointer. Drawing is emitted as
//! backend-agnostic [`render::RenderFrame`]s.

pub mod api;
pub mod core;
pub mod error;
pub mod generators;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartUpdate, TimeChart, TimeChartConfig};
pub use error::{ChartError, ChartResult};
