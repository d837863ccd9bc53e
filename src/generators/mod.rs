//! Per-series rendering generators.
//!
//! Every generator owns the buffer of the series it draws and implements
//! [`SeriesGenerator`]. Hover support is an optional capability exposed via
//! [`SeriesGenerator::hover_finder`] and [`SeriesGenerator::hover_highlighter`];
//! callers must tolerate either being absent.

mod event_markers;
mod line;
mod time_bars;

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{
    DEFAULT_HOVER_THRESHOLD_PX, DataPoint, LinearScale, MAX_LABEL_CHARS, SeriesId, TimeRange,
    ValueFormat, format_field_value, truncate_label,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, RenderFrame};

pub use event_markers::{EventMarker, EventMarkersGenerator, MarkerDiff, MarkerKey};
pub use line::{LineEntry, LineGenerator};
pub use time_bars::{TimeBar, TimeBarsGenerator};

/// Generator flavor. Declaration order is the tooltip category order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Line,
    TimeBars,
    EventMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Left,
    Right,
}

/// Presentation metadata of one visible series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub id: SeriesId,
    pub label: String,
    pub color: Color,
    pub axis: Axis,
    pub value_format: ValueFormat,
}

/// New data for one series, ascending by time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesPayload {
    pub data: Vec<DataPoint>,
    /// Times at which a line must show a gap.
    pub breaks: Vec<f64>,
}

impl SeriesPayload {
    #[must_use]
    pub fn new(data: Vec<DataPoint>) -> Self {
        Self {
            data,
            breaks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_breaks(mut self, breaks: Vec<f64>) -> Self {
        self.breaks = breaks;
        self
    }
}

/// A buffered point together with its resolved time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedPoint {
    pub time: f64,
    pub point: Rc<DataPoint>,
}

/// One row of the hover tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipFragment {
    pub series_id: SeriesId,
    pub kind: GeneratorKind,
    pub label: String,
    pub value: String,
    pub color: Color,
    pub is_first: bool,
    pub is_last: bool,
}

/// Settings shared by all generator kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    pub time_field: String,
    pub value_field: String,
    pub hover_threshold_px: f64,
    pub stroke_width: f64,
    pub point_radius: f64,
    pub highlight_radius: f64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            time_field: "time".to_owned(),
            value_field: "value".to_owned(),
            hover_threshold_px: DEFAULT_HOVER_THRESHOLD_PX,
            stroke_width: 1.5,
            point_radius: 2.5,
            highlight_radius: 4.0,
        }
    }
}

/// Shared generator contract.
pub trait SeriesGenerator {
    fn kind(&self) -> GeneratorKind;

    /// Stores the scales used for every later coordinate conversion.
    ///
    /// Fails with [`ChartError::MissingScale`] when either scale is absent.
    fn set_scales(&mut self, x: Option<LinearScale>, y: Option<LinearScale>) -> ChartResult<()>;

    /// Replaces the buffer with `payload` and redraws against `range`.
    fn update(&mut self, payload: SeriesPayload, range: TimeRange) -> ChartResult<()>;

    /// Redraws the current buffer against a new range.
    fn redraw(&mut self, range: TimeRange) -> ChartResult<()>;

    fn tooltip_contents(&self, point: Option<&DataPoint>, meta: &SeriesMeta)
    -> Option<TooltipFragment>;

    /// Adapts the scale pixel ranges to a new plot size, keeping the buffer.
    fn resize(&mut self, width: f64, height: f64) -> ChartResult<()>;

    fn show(&mut self);

    fn hide(&mut self);

    fn is_visible(&self) -> bool;

    /// Appends this series' primitives to `frame`. Hidden generators draw nothing.
    fn draw(&self, frame: &mut RenderFrame, meta: &SeriesMeta) -> ChartResult<()>;

    /// Numeric min/max of buffered values, used for y autoscaling.
    fn value_extent(&self) -> Option<(f64, f64)>;

    fn hover_finder(&self) -> Option<&dyn HoverFind> {
        None
    }

    fn hover_highlighter(&mut self) -> Option<&mut dyn HoverHighlight> {
        None
    }
}

/// Closest-point lookup for hover.
pub trait HoverFind {
    /// Buffered point shown at domain time `time`, if close enough to count.
    fn hover_find(&self, time: f64) -> Option<Rc<DataPoint>>;
}

/// Single-element hover highlight.
pub trait HoverHighlight {
    /// Highlights `point` and clears any previous highlight.
    fn hover_on(&mut self, point: &Rc<DataPoint>);

    /// Clears the highlight. No-op when nothing is highlighted.
    fn hover_off(&mut self);

    fn highlighted_count(&self) -> usize;
}

/// Scale and visibility bookkeeping embedded in every generator.
#[derive(Debug, Clone)]
pub(crate) struct GeneratorState {
    pub(crate) options: GeneratorOptions,
    pub(crate) range: Option<TimeRange>,
    pub(crate) visible: bool,
    x_scale: Option<LinearScale>,
    y_scale: Option<LinearScale>,
}

impl GeneratorState {
    pub(crate) fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            range: None,
            visible: true,
            x_scale: None,
            y_scale: None,
        }
    }

    pub(crate) fn set_scales(
        &mut self,
        x: Option<LinearScale>,
        y: Option<LinearScale>,
    ) -> ChartResult<()> {
        let x = x.ok_or(ChartError::MissingScale { axis: "x" })?;
        let y = y.ok_or(ChartError::MissingScale { axis: "y" })?;
        self.x_scale = Some(x);
        self.y_scale = Some(y);
        Ok(())
    }

    pub(crate) fn scales(&self) -> ChartResult<(LinearScale, LinearScale)> {
        let x = self.x_scale.ok_or(ChartError::MissingScale { axis: "x" })?;
        let y = self.y_scale.ok_or(ChartError::MissingScale { axis: "y" })?;
        Ok((x, y))
    }

    pub(crate) fn x_scale(&self) -> Option<LinearScale> {
        self.x_scale
    }

    pub(crate) fn resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(ChartError::InvalidData(
                "generator size must be finite and > 0".to_owned(),
            ));
        }
        if let Some(x) = self.x_scale {
            self.x_scale = Some(x.with_range((0.0, width))?);
        }
        if let Some(y) = self.y_scale {
            self.y_scale = Some(y.with_range((height, 0.0))?);
        }
        Ok(())
    }

    /// Wraps payload points for buffering, dropping those without a time.
    pub(crate) fn timed_points(&self, data: Vec<DataPoint>) -> Vec<TimedPoint> {
        let time_field = self.options.time_field.as_str();
        let total = data.len();
        let points: Vec<TimedPoint> = data
            .into_iter()
            .filter_map(|point| {
                let time = point.time(time_field)?;
                Some(TimedPoint {
                    time,
                    point: Rc::new(point),
                })
            })
            .collect();
        if points.len() < total {
            warn!(
                dropped = total - points.len(),
                time_field, "dropping points without a usable time"
            );
        }
        points
    }

    pub(crate) fn value_of(&self, point: &DataPoint) -> Option<f64> {
        point
            .number(&self.options.value_field)
            .filter(|value| value.is_finite())
    }

    pub(crate) fn value_extent<'a>(
        &self,
        points: impl Iterator<Item = &'a TimedPoint>,
    ) -> Option<(f64, f64)> {
        points
            .filter_map(|entry| self.value_of(&entry.point))
            .fold(None, |acc, value| match acc {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })
    }

    pub(crate) fn tooltip_fragment(
        &self,
        kind: GeneratorKind,
        point: Option<&DataPoint>,
        meta: &SeriesMeta,
    ) -> Option<TooltipFragment> {
        let point = point?;
        let mut label = truncate_label(&meta.label, MAX_LABEL_CHARS);
        if meta.axis == Axis::Right {
            label.push_str(" (RHS)");
        }
        Some(TooltipFragment {
            series_id: meta.id,
            kind,
            label,
            value: format_field_value(point.get(&self.options.value_field), meta.value_format),
            color: meta.color,
            is_first: false,
            is_last: false,
        })
    }
}

/// Index of the buffered point that `point` refers to, by reference identity.
pub(crate) fn position_by_identity(buffer: &[TimedPoint], point: &Rc<DataPoint>) -> Option<usize> {
    buffer
        .iter()
        .position(|entry| Rc::ptr_eq(&entry.point, point))
}
