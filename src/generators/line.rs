use std::rc::Rc;

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::core::{DataPoint, LinearScale, TimeRange, closest_index_by, within_pixel_threshold};
use crate::error::ChartResult;
use crate::generators::{
    GeneratorKind, GeneratorOptions, GeneratorState, HoverFind, HoverHighlight, SeriesGenerator,
    SeriesMeta, SeriesPayload, TimedPoint, TooltipFragment, position_by_identity,
};
use crate::render::{CirclePrimitive, LinePrimitive, RenderFrame};

/// One slot of a line buffer: a real sample or a forced gap.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEntry {
    Sample(TimedPoint),
    Break { time: f64 },
}

impl LineEntry {
    #[must_use]
    pub fn time(&self) -> f64 {
        match self {
            Self::Sample(sample) => sample.time,
            Self::Break { time } => *time,
        }
    }
}

/// Connected line through a series' samples.
///
/// Paths are split at interpolation breaks and at samples without a numeric
/// value. A sample left alone between two splits cannot be stroked, so it is
/// drawn as a standalone marker instead.
#[derive(Debug, Clone)]
pub struct LineGenerator {
    state: GeneratorState,
    buffer: Vec<LineEntry>,
    samples: Vec<TimedPoint>,
    paths: Vec<Vec<(f64, f64)>>,
    lonely: Vec<(f64, f64)>,
    highlighted: Option<Rc<DataPoint>>,
}

impl LineGenerator {
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            state: GeneratorState::new(options),
            buffer: Vec::new(),
            samples: Vec::new(),
            paths: Vec::new(),
            lonely: Vec::new(),
            highlighted: None,
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &[LineEntry] {
        &self.buffer
    }

    /// Connected pixel paths from the last redraw, each with at least two points.
    #[must_use]
    pub fn paths(&self) -> &[Vec<(f64, f64)>] {
        &self.paths
    }

    /// Pixel positions of samples with no connectable neighbor.
    #[must_use]
    pub fn lonely_points(&self) -> &[(f64, f64)] {
        &self.lonely
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&Rc<DataPoint>> {
        self.highlighted.as_ref()
    }

    fn rebuild(&mut self) -> ChartResult<()> {
        let (x, y) = self.state.scales()?;
        let mut paths = Vec::new();
        let mut lonely = Vec::new();
        let mut run = Vec::new();

        for entry in &self.buffer {
            let coords = match entry {
                LineEntry::Sample(sample) => self
                    .state
                    .value_of(&sample.point)
                    .map(|value| (x.map(sample.time), y.map(value))),
                LineEntry::Break { .. } => None,
            };
            match coords {
                Some(coords) => run.push(coords),
                None => flush_run(&mut run, &mut paths, &mut lonely),
            }
        }
        flush_run(&mut run, &mut paths, &mut lonely);

        trace!(
            paths = paths.len(),
            lonely = lonely.len(),
            "line draw state rebuilt"
        );
        self.paths = paths;
        self.lonely = lonely;
        Ok(())
    }

    fn highlight_position(&self, x: LinearScale, y: LinearScale) -> Option<(f64, f64)> {
        let point = self.highlighted.as_ref()?;
        let index = position_by_identity(&self.samples, point)?;
        let sample = &self.samples[index];
        let value = self.state.value_of(&sample.point)?;
        Some((x.map(sample.time), y.map(value)))
    }
}

impl Default for LineGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

fn flush_run(
    run: &mut Vec<(f64, f64)>,
    paths: &mut Vec<Vec<(f64, f64)>>,
    lonely: &mut Vec<(f64, f64)>,
) {
    match run.len() {
        0 => {}
        1 => {
            lonely.push(run[0]);
            run.clear();
        }
        _ => paths.push(std::mem::take(run)),
    }
}

impl SeriesGenerator for LineGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Line
    }

    fn set_scales(&mut self, x: Option<LinearScale>, y: Option<LinearScale>) -> ChartResult<()> {
        self.state.set_scales(x, y)
    }

    fn update(&mut self, payload: SeriesPayload, range: TimeRange) -> ChartResult<()> {
        let SeriesPayload { data, breaks } = payload;
        let incoming = self.state.timed_points(data);
        let first_new = incoming.first().map_or(f64::INFINITY, |sample| sample.time);

        // Older samples that are still on screen survive until they scroll out.
        let mut buffer: Vec<LineEntry> = self
            .buffer
            .drain(..)
            .filter(|entry| entry.time() < first_new && range.contains(entry.time()))
            .collect();
        let carried = buffer.len();
        buffer.extend(incoming.into_iter().map(LineEntry::Sample));
        buffer.extend(
            breaks
                .into_iter()
                .filter(|time| time.is_finite())
                .map(|time| LineEntry::Break { time }),
        );
        buffer.sort_by_key(|entry| OrderedFloat(entry.time()));

        self.samples = buffer
            .iter()
            .filter_map(|entry| match entry {
                LineEntry::Sample(sample) => Some(sample.clone()),
                LineEntry::Break { .. } => None,
            })
            .collect();
        self.buffer = buffer;
        trace!(
            carried,
            samples = self.samples.len(),
            "line buffer updated"
        );

        let stale = self
            .highlighted
            .as_ref()
            .is_some_and(|point| position_by_identity(&self.samples, point).is_none());
        if stale {
            self.highlighted = None;
        }
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
        self.state.tooltip_fragment(GeneratorKind::Line, point, meta)
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
        if !self.state.visible || (self.paths.is_empty() && self.lonely.is_empty()) {
            return Ok(());
        }
        let (x, y) = self.state.scales()?;
        let options = &self.state.options;
        for path in &self.paths {
            for pair in path.windows(2) {
                frame.lines.push(LinePrimitive::new(
                    pair[0].0,
                    pair[0].1,
                    pair[1].0,
                    pair[1].1,
                    options.stroke_width,
                    meta.color,
                ));
            }
        }
        for &(cx, cy) in &self.lonely {
            frame
                .circles
                .push(CirclePrimitive::new(cx, cy, options.point_radius, meta.color));
        }
        if let Some((cx, cy)) = self.highlight_position(x, y) {
            frame
                .circles
                .push(CirclePrimitive::new(cx, cy, options.highlight_radius, meta.color));
        }
        Ok(())
    }

    fn value_extent(&self) -> Option<(f64, f64)> {
        self.state.value_extent(self.samples.iter())
    }

    fn hover_finder(&self) -> Option<&dyn HoverFind> {
        Some(self)
    }

    fn hover_highlighter(&mut self) -> Option<&mut dyn HoverHighlight> {
        Some(self)
    }
}

impl HoverFind for LineGenerator {
    fn hover_find(&self, time: f64) -> Option<Rc<DataPoint>> {
        let x = self.state.x_scale()?;
        let index = closest_index_by(time, &self.samples, |sample| sample.time, None)?;
        let candidate = &self.samples[index];
        within_pixel_threshold(time, candidate.time, x, self.state.options.hover_threshold_px)
            .then(|| Rc::clone(&candidate.point))
    }
}

impl HoverHighlight for LineGenerator {
    fn hover_on(&mut self, point: &Rc<DataPoint>) {
        self.highlighted =
            position_by_identity(&self.samples, point).map(|_| Rc::clone(point));
    }

    fn hover_off(&mut self) {
        self.highlighted = None;
    }

    fn highlighted_count(&self) -> usize {
        usize::from(self.highlighted.is_some())
    }
}
