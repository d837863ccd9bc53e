use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{DataPoint, LinearScale, SearchSide, TimeRange, closest_index_by};
use crate::error::ChartResult;
use crate::generators::{
    GeneratorKind, GeneratorOptions, GeneratorState, HoverFind, HoverHighlight, SeriesGenerator,
    SeriesMeta, SeriesPayload, TimedPoint, TooltipFragment, position_by_identity,
};
use crate::render::{RectPrimitive, RenderFrame};

/// Geometry of one interval bar.
///
/// A bar spans from the previous sample (or the x domain start for the first
/// bar) up to its own sample time. Hover treats the span as closed,
/// `[start, end]`, so a shared boundary resolves to the earlier bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBar {
    pub start: f64,
    pub end: f64,
    pub value: Option<f64>,
    pub x_left: f64,
    pub x_right: f64,
    pub y_top: f64,
    pub y_bottom: f64,
}

impl TimeBar {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Bars whose samples each summarize the interval since the previous sample.
#[derive(Debug, Clone)]
pub struct TimeBarsGenerator {
    state: GeneratorState,
    buffer: Vec<TimedPoint>,
    bars: Vec<TimeBar>,
    highlighted: Option<usize>,
}

impl TimeBarsGenerator {
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            state: GeneratorState::new(options),
            buffer: Vec::new(),
            bars: Vec::new(),
            highlighted: None,
        }
    }

    #[must_use]
    pub fn bars(&self) -> &[TimeBar] {
        &self.bars
    }

    #[must_use]
    pub fn buffer(&self) -> &[TimedPoint] {
        &self.buffer
    }

    #[must_use]
    pub fn highlighted_bar(&self) -> Option<&TimeBar> {
        self.highlighted.and_then(|index| self.bars.get(index))
    }

    fn bar_start(&self, index: usize, x: LinearScale) -> f64 {
        match index {
            0 => x.domain().0.min(self.buffer[0].time),
            _ => self.buffer[index - 1].time,
        }
    }

    fn rebuild(&mut self) -> ChartResult<()> {
        let (x, y) = self.state.scales()?;
        let (lo, hi) = y.domain();
        let baseline = y.map(0.0_f64.clamp(lo.min(hi), lo.max(hi)));

        let bars = (0..self.buffer.len())
            .map(|index| {
                let start = self.bar_start(index, x);
                let end = self.buffer[index].time;
                let value = self.state.value_of(&self.buffer[index].point);
                let top = value.map_or(baseline, |value| y.map(value));
                TimeBar {
                    start,
                    end,
                    value,
                    x_left: x.map(start),
                    x_right: x.map(end),
                    y_top: top.min(baseline),
                    y_bottom: top.max(baseline),
                }
            })
            .collect::<Vec<_>>();
        trace!(bars = bars.len(), "time bars rebuilt");
        self.bars = bars;
        Ok(())
    }
}

impl Default for TimeBarsGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl SeriesGenerator for TimeBarsGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::TimeBars
    }

    fn set_scales(&mut self, x: Option<LinearScale>, y: Option<LinearScale>) -> ChartResult<()> {
        self.state.set_scales(x, y)
    }

    fn update(&mut self, payload: SeriesPayload, range: TimeRange) -> ChartResult<()> {
        self.buffer = self.state.timed_points(payload.data);
        self.highlighted = None;
        self.redraw(range)
    }

    fn redraw(&mut self, range: TimeRange) -> ChartResult<()> {
        self.state.range = Some(range);
        self.rebuild()
    }

    fn tooltip_contents(
        &self,
        point: Option<&DataPoint>,
        meta: &SeriesMeta,
    ) -> Option<TooltipFragment> {
        self.state
            .tooltip_fragment(GeneratorKind::TimeBars, point, meta)
    }

    fn resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        self.state.resize(width, height)?;
        if self.state.scales().is_ok() {
            self.rebuild()?;
        }
        Ok(())
    }

    fn show(&mut self) {
        self.state.visible = true;
    }

    fn hide(&mut self) {
        self.state.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.state.visible
    }

    fn draw(&self, frame: &mut RenderFrame, meta: &SeriesMeta) -> ChartResult<()> {
        if !self.state.visible {
            return Ok(());
        }
        let dimmed = meta.color.with_alpha(0.6);
        for (index, bar) in self.bars.iter().enumerate() {
            if bar.value.is_none() {
                continue;
            }
            let fill = if self.highlighted == Some(index) {
                meta.color
            } else {
                dimmed
            };
            let left = bar.x_left.min(bar.x_right);
            frame.rects.push(RectPrimitive::new(
                left,
                bar.y_top,
                (bar.x_right - bar.x_left).abs(),
                bar.y_bottom - bar.y_top,
                fill,
            ));
        }
        Ok(())
    }

    fn value_extent(&self) -> Option<(f64, f64)> {
        self.state.value_extent(self.buffer.iter())
    }

    fn hover_finder(&self) -> Option<&dyn HoverFind> {
        Some(self)
    }

    fn hover_highlighter(&mut self) -> Option<&mut dyn HoverHighlight> {
        Some(self)
    }
}

impl HoverFind for TimeBarsGenerator {
    /// Resolves `time` to the bar covering it rather than the nearest sample.
    ///
    /// The lookup takes the first sample at or after `time`, then checks
    /// `start <= time <= end`. A query exactly on a sample time therefore
    /// returns the bar ending there, and the x domain start belongs to the
    /// first bar. Times past the last sample find nothing.
    fn hover_find(&self, time: f64) -> Option<Rc<DataPoint>> {
        let x = self.state.x_scale()?;
        let index = closest_index_by(time, &self.buffer, |sample| sample.time, Some(SearchSide::Left))?;
        let end = self.buffer[index].time;
        let start = self.bar_start(index, x);
        (time >= start && time <= end).then(|| Rc::clone(&self.buffer[index].point))
    }
}

impl HoverHighlight for TimeBarsGenerator {
    fn hover_on(&mut self, point: &Rc<DataPoint>) {
        self.highlighted = position_by_identity(&self.buffer, point);
    }

    fn hover_off(&mut self) {
        self.highlighted = None;
    }

    fn highlighted_count(&self) -> usize {
        usize::from(self.highlighted.is_some())
    }
}
