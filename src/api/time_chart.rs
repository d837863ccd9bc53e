use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::{debug, trace, warn};

use crate::core::{
    ChartGeometry, DataPoint, LinearScale, SeriesDetector, SeriesId, TimeRange, Viewport,
};
use crate::error::{ChartError, ChartResult};
use crate::generators::{Axis, SeriesGenerator, SeriesPayload};
use crate::interaction::{HoverMode, PointerEvent, Tooltip};
use crate::render::{Color, LinePrimitive, RenderFrame, Renderer};

use super::{
    HoverContext, HoverCoordinator, HoverSelection, HoverSnapshot, SeriesEntry, SeriesRegistry,
    TimeChartConfig,
};

const AUTOSCALE_PADDING_RATIO: f64 = 0.05;
const HOVER_INDICATOR_COLOR: Color = Color::rgba(0.4, 0.4, 0.4, 0.8);
const HOVER_INDICATOR_WIDTH: f64 = 1.0;

/// One batch of streamed data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartUpdate {
    pub points: Vec<DataPoint>,
    /// Gap times applied to every series receiving data in this batch.
    pub breaks: Vec<f64>,
    /// New displayed time range; the current one is kept when absent.
    pub range: Option<TimeRange>,
}

impl ChartUpdate {
    #[must_use]
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self {
            points,
            breaks: Vec::new(),
            range: None,
        }
    }

    #[must_use]
    pub fn with_breaks(mut self, breaks: Vec<f64>) -> Self {
        self.breaks = breaks;
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// Time chart container.
///
/// Owns series detection, one generator per series, the displayed scales and
/// the hover coordinator. Pointer coordinates are chart-local pixels; series
/// geometry lives in plot-local pixels and is shifted by the margins when
/// rendered.
pub struct TimeChart<R: Renderer> {
    renderer: R,
    config: TimeChartConfig,
    geometry: ChartGeometry,
    detector: SeriesDetector,
    registry: SeriesRegistry,
    range: TimeRange,
    x_scale: LinearScale,
    left_scale: LinearScale,
    right_scale: LinearScale,
    hover: HoverCoordinator,
    tooltip: Tooltip,
}

impl<R: Renderer> TimeChart<R> {
    pub fn new(renderer: R, config: TimeChartConfig) -> ChartResult<Self> {
        config.validate()?;
        let geometry = ChartGeometry::new(config.viewport, config.margins)?;
        let range = config.initial_range;
        let x_scale = LinearScale::new((range.start, range.end), (0.0, geometry.plot_width()))?;
        let y_range = (geometry.plot_height(), 0.0);
        let left_scale = LinearScale::new(config.left_domain.unwrap_or((0.0, 1.0)), y_range)?;
        let right_scale = LinearScale::new(config.right_domain.unwrap_or((0.0, 1.0)), y_range)?;

        let mut detector = SeriesDetector::new(config.time_field.clone())
            .with_ignored_fields(config.fields_to_ignore.iter().cloned());
        if let Some(key_field) = &config.key_field {
            detector = detector.with_key_field(key_field.clone());
        }
        let tooltip = Tooltip::new(config.tooltip)?;

        debug!(
            width = config.viewport.width,
            height = config.viewport.height,
            start = range.start,
            end = range.end,
            "time chart created"
        );
        Ok(Self {
            renderer,
            config,
            geometry,
            detector,
            registry: SeriesRegistry::default(),
            range,
            x_scale,
            left_scale,
            right_scale,
            hover: HoverCoordinator::new(),
            tooltip,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TimeChartConfig {
        &self.config
    }

    #[must_use]
    pub fn geometry(&self) -> ChartGeometry {
        self.geometry
    }

    #[must_use]
    pub fn range(&self) -> TimeRange {
        self.range
    }

    #[must_use]
    pub fn detector(&self) -> &SeriesDetector {
        &self.detector
    }

    #[must_use]
    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    #[must_use]
    pub fn series_entry(&self, id: SeriesId) -> Option<&SeriesEntry> {
        self.registry.get(id)
    }

    #[must_use]
    pub fn generator(&self, id: SeriesId) -> Option<&dyn SeriesGenerator> {
        self.registry.get(id).map(SeriesEntry::generator)
    }

    #[must_use]
    pub fn series_label(&self, id: SeriesId) -> Option<&str> {
        self.registry.get(id).map(|entry| entry.meta().label.as_str())
    }

    /// Ids of series currently shown, in creation order.
    #[must_use]
    pub fn visible_series(&self) -> Vec<SeriesId> {
        self.registry
            .iter()
            .filter(|entry| entry.is_visible())
            .map(|entry| entry.series().id)
            .collect()
    }

    /// Time scale in plot-local pixels.
    #[must_use]
    pub fn displayed_x_scale(&self) -> LinearScale {
        self.x_scale
    }

    #[must_use]
    pub fn y_scale(&self, axis: Axis) -> LinearScale {
        match axis {
            Axis::Left => self.left_scale,
            Axis::Right => self.right_scale,
        }
    }

    #[must_use]
    pub fn hover_mode(&self) -> HoverMode {
        self.hover.mode()
    }

    #[must_use]
    pub fn hover_selection(&self) -> Option<&HoverSelection> {
        self.hover.selection()
    }

    #[must_use]
    pub fn hover_snapshot(&self) -> HoverSnapshot {
        self.hover.snapshot()
    }

    #[must_use]
    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Feeds a batch of points, creating generators for newly seen series.
    ///
    /// Series that receive no points in the batch are redrawn against the
    /// new range with their buffer intact.
    pub fn update(&mut self, update: ChartUpdate) -> ChartResult<()> {
        let ChartUpdate {
            points,
            breaks,
            range,
        } = update;
        if let Some(range) = range {
            self.range = TimeRange::new(range.start, range.end)?;
            self.x_scale = self.x_scale.with_domain((range.start, range.end))?;
        }

        let time_field = self.config.time_field.as_str();
        let total = points.len();
        let mut grouped: IndexMap<SeriesId, Vec<DataPoint>> = IndexMap::new();
        for point in points {
            if point.time(time_field).is_none() {
                continue;
            }
            let series = self.detector.series_for_point(&point).clone();
            if !self.registry.contains(series.id) {
                self.registry
                    .insert(SeriesRegistry::entry_for(&series, &self.config));
            }
            grouped.entry(series.id).or_default().push(point);
        }
        let accepted: usize = grouped.values().map(Vec::len).sum();
        if accepted < total {
            warn!(
                dropped = total - accepted,
                time_field, "dropping points without a usable time"
            );
        }

        let range = self.range;
        let x_scale = self.x_scale;
        let (left, right) = (self.left_scale, self.right_scale);
        for entry in self.registry.iter_mut() {
            let y_scale = match entry.meta().axis {
                Axis::Left => left,
                Axis::Right => right,
            };
            let id = entry.series().id;
            let generator = entry.generator_mut();
            generator.set_scales(Some(x_scale), Some(y_scale))?;
            match grouped.swap_remove(&id) {
                Some(mut data) => {
                    data.sort_by_key(|point| {
                        OrderedFloat(point.time(time_field).unwrap_or(f64::NEG_INFINITY))
                    });
                    trace!(series = %id, points = data.len(), "series payload");
                    generator.update(SeriesPayload::new(data).with_breaks(breaks.clone()), range)?;
                }
                None => generator.redraw(range)?,
            }
        }
        debug!(
            points = accepted,
            series = self.registry.len(),
            "chart update applied"
        );

        self.autoscale()?;
        self.refresh_hover();
        Ok(())
    }

    pub fn pointer_enter(&mut self, x: f64, y: f64) {
        self.handle_pointer(PointerEvent::Enter { x, y });
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.handle_pointer(PointerEvent::Move { x, y });
    }

    pub fn pointer_leave(&mut self) {
        self.handle_pointer(PointerEvent::Leave);
    }

    /// Toggles the pinned tooltip.
    pub fn click(&mut self) {
        self.handle_pointer(PointerEvent::Click);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let (hover, ctx) = self.hover_parts();
        hover.handle_pointer(event, ctx);
    }

    /// Sets the tooltip order inside each generator category.
    pub fn set_series_order(&mut self, order: Vec<SeriesId>) {
        self.hover.set_series_order(Some(order));
        self.refresh_hover();
    }

    pub fn clear_series_order(&mut self) {
        self.hover.set_series_order(None);
        self.refresh_hover();
    }

    pub fn set_series_visible(&mut self, id: SeriesId, visible: bool) -> ChartResult<()> {
        let entry = self
            .registry
            .get_mut(id)
            .ok_or(ChartError::UnknownSeries(id))?;
        if visible {
            entry.generator_mut().show();
        } else {
            entry.generator_mut().hide();
        }
        debug!(series = %id, visible, "series visibility changed");
        self.autoscale()?;
        self.refresh_hover();
        Ok(())
    }

    /// Resizes the whole chart, keeping every buffer.
    pub fn resize(&mut self, width: u32, height: u32) -> ChartResult<()> {
        let geometry = ChartGeometry::new(Viewport::new(width, height), self.config.margins)?;
        let (plot_width, plot_height) = (geometry.plot_width(), geometry.plot_height());
        self.x_scale = self.x_scale.with_range((0.0, plot_width))?;
        self.left_scale = self.left_scale.with_range((plot_height, 0.0))?;
        self.right_scale = self.right_scale.with_range((plot_height, 0.0))?;
        for entry in self.registry.iter_mut() {
            entry.generator_mut().resize(plot_width, plot_height)?;
        }
        self.geometry = geometry;
        self.config.viewport = geometry.viewport;
        debug!(width, height, "chart resized");
        self.refresh_hover();
        Ok(())
    }

    /// Steps the tooltip glide; returns `true` while another frame is needed.
    pub fn advance_tooltip(&mut self, delta_seconds: f64) -> ChartResult<bool> {
        self.tooltip.advance(delta_seconds)
    }

    /// Materializes the current scene and hands it to the renderer.
    pub fn render(&mut self) -> ChartResult<()> {
        let frame = self.build_render_frame()?;
        self.renderer.render(&frame)
    }

    pub fn build_render_frame(&self) -> ChartResult<RenderFrame> {
        let margins = self.geometry.margins;
        let mut plot = RenderFrame::new(self.geometry.viewport);
        for entry in self.registry.iter() {
            entry.generator().draw(&mut plot, entry.meta())?;
        }
        if let Some(selection) = self.hover.selection() {
            let x = self.x_scale.map(selection.time);
            if x.is_finite() {
                plot.lines.push(LinePrimitive::vertical(
                    x,
                    0.0,
                    self.geometry.plot_height(),
                    HOVER_INDICATOR_WIDTH,
                    HOVER_INDICATOR_COLOR,
                ));
            }
        }
        plot.translate(margins.left, margins.top);

        let mut frame = RenderFrame::new(self.geometry.viewport);
        frame.append(plot);
        self.tooltip.draw(&mut frame);
        Ok(frame)
    }

    fn hover_parts(&mut self) -> (&mut HoverCoordinator, HoverContext<'_>) {
        let Self {
            hover,
            registry,
            tooltip,
            config,
            geometry,
            x_scale,
            ..
        } = self;
        (
            hover,
            HoverContext {
                x_scale: *x_scale,
                geometry: *geometry,
                series: registry.as_mut_slice(),
                tooltip,
                time_format: &config.time_format,
                animate_tooltip: config.animate_tooltip,
            },
        )
    }

    fn refresh_hover(&mut self) {
        let (hover, ctx) = self.hover_parts();
        hover.on_chart_changed(ctx);
    }

    fn autoscale(&mut self) -> ChartResult<()> {
        let left = self.axis_domain(Axis::Left);
        let right = self.axis_domain(Axis::Right);
        if left == self.left_scale.domain() && right == self.right_scale.domain() {
            return Ok(());
        }
        self.left_scale = self.left_scale.with_domain(left)?;
        self.right_scale = self.right_scale.with_domain(right)?;
        trace!(?left, ?right, "value domains rescaled");

        let (x_scale, range) = (self.x_scale, self.range);
        let (left, right) = (self.left_scale, self.right_scale);
        for entry in self.registry.iter_mut() {
            let y_scale = match entry.meta().axis {
                Axis::Left => left,
                Axis::Right => right,
            };
            let generator = entry.generator_mut();
            generator.set_scales(Some(x_scale), Some(y_scale))?;
            generator.redraw(range)?;
        }
        Ok(())
    }

    fn axis_domain(&self, axis: Axis) -> (f64, f64) {
        let fixed = match axis {
            Axis::Left => self.config.left_domain,
            Axis::Right => self.config.right_domain,
        };
        if let Some(domain) = fixed {
            return domain;
        }
        let extent = self
            .registry
            .iter()
            .filter(|entry| entry.is_visible() && entry.meta().axis == axis)
            .filter_map(|entry| entry.generator().value_extent())
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)));
        padded_domain(extent)
    }
}

/// Value domain covering `extent` with a little headroom on both ends.
#[must_use]
pub fn padded_domain(extent: Option<(f64, f64)>) -> (f64, f64) {
    let Some((min, max)) = extent else {
        return (0.0, 1.0);
    };
    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        let half = (min.abs() * AUTOSCALE_PADDING_RATIO).max(0.5);
        return (min - half, max + half);
    }
    let pad = span * AUTOSCALE_PADDING_RATIO;
    (min - pad, max + pad)
}
