use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use tracing::trace;

use crate::core::{DataPoint, LinearScale, TimeRange, closest_index_by, within_pixel_threshold};
use crate::error::ChartResult;
use crate::generators::{
    GeneratorKind, GeneratorOptions, GeneratorState, HoverFind, HoverHighlight, SeriesGenerator,
    SeriesMeta, SeriesPayload, TimedPoint, TooltipFragment,
};
use crate::render::{CirclePrimitive, LinePrimitive, RenderFrame};

/// Join key of a marker: its x value, plus an ordinal among events sharing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey {
    pub time: OrderedFloat<f64>,
    pub ordinal: usize,
}

impl MarkerKey {
    #[must_use]
    pub fn new(time: f64, ordinal: usize) -> Self {
        Self {
            time: OrderedFloat(time),
            ordinal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    pub key: MarkerKey,
    pub x: f64,
    pub y: f64,
    pub point: Rc<DataPoint>,
    pub highlighted: bool,
}

/// Enter/update/exit partition produced by the last `update`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerDiff {
    pub entered: Vec<MarkerKey>,
    pub updated: Vec<MarkerKey>,
    pub exited: Vec<MarkerKey>,
}

/// Point markers for discrete events, drawn as a dot over a thin rule.
#[derive(Debug, Clone)]
pub struct EventMarkersGenerator {
    state: GeneratorState,
    buffer: Vec<TimedPoint>,
    markers: IndexMap<MarkerKey, EventMarker>,
    last_diff: MarkerDiff,
}

impl EventMarkersGenerator {
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            state: GeneratorState::new(options),
            buffer: Vec::new(),
            markers: IndexMap::new(),
            last_diff: MarkerDiff::default(),
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = &EventMarker> {
        self.markers.values()
    }

    #[must_use]
    pub fn marker(&self, key: MarkerKey) -> Option<&EventMarker> {
        self.markers.get(&key)
    }

    #[must_use]
    pub fn last_diff(&self) -> &MarkerDiff {
        &self.last_diff
    }

    #[must_use]
    pub fn buffer(&self) -> &[TimedPoint] {
        &self.buffer
    }

    fn keyed_buffer(&self) -> Vec<(MarkerKey, &TimedPoint)> {
        let mut keyed = Vec::with_capacity(self.buffer.len());
        let mut previous: Option<(f64, usize)> = None;
        for entry in &self.buffer {
            let ordinal = match previous {
                Some((time, ordinal)) if time == entry.time => ordinal + 1,
                _ => 0,
            };
            previous = Some((entry.time, ordinal));
            keyed.push((MarkerKey::new(entry.time, ordinal), entry));
        }
        keyed
    }

    fn marker_position(&self, entry: &TimedPoint, x: LinearScale, y: LinearScale) -> (f64, f64) {
        let (range_a, range_b) = y.range();
        let top = range_a.min(range_b) + self.state.options.highlight_radius;
        let cy = self
            .state
            .value_of(&entry.point)
            .map_or(top, |value| y.map(value));
        (x.map(entry.time), cy)
    }

    fn rebuild(&mut self) -> ChartResult<()> {
        let (x, y) = self.state.scales()?;
        let highlighted: Option<Rc<DataPoint>> = self
            .markers
            .values()
            .find(|marker| marker.highlighted)
            .map(|marker| Rc::clone(&marker.point));

        let markers = self
            .keyed_buffer()
            .into_iter()
            .map(|(key, entry)| {
                let (cx, cy) = self.marker_position(entry, x, y);
                let marker = EventMarker {
                    key,
                    x: cx,
                    y: cy,
                    point: Rc::clone(&entry.point),
                    highlighted: highlighted
                        .as_ref()
                        .is_some_and(|point| Rc::ptr_eq(point, &entry.point)),
                };
                (key, marker)
            })
            .collect::<IndexMap<_, _>>();
        self.markers = markers;
        Ok(())
    }
}

impl Default for EventMarkersGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl SeriesGenerator for EventMarkersGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::EventMarkers
    }

    fn set_scales(&mut self, x: Option<LinearScale>, y: Option<LinearScale>) -> ChartResult<()> {
        self.state.set_scales(x, y)
    }

    fn update(&mut self, payload: SeriesPayload, range: TimeRange) -> ChartResult<()> {
        self.buffer = self.state.timed_points(payload.data);

        let incoming: IndexSet<MarkerKey> =
            self.keyed_buffer().into_iter().map(|(key, _)| key).collect();
        let mut diff = MarkerDiff::default();
        for key in &incoming {
            if self.markers.contains_key(key) {
                diff.updated.push(*key);
            } else {
                diff.entered.push(*key);
            }
        }
        diff.exited = self
            .markers
            .keys()
            .filter(|key| !incoming.contains(*key))
            .copied()
            .collect();
        trace!(
            entered = diff.entered.len(),
            updated = diff.updated.len(),
            exited = diff.exited.len(),
            "event markers joined"
        );
        self.last_diff = diff;

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
            .tooltip_fragment(GeneratorKind::EventMarkers, point, meta)
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
        let (_, y) = self.state.scales()?;
        let (range_a, range_b) = y.range();
        let rule = meta.color.with_alpha(0.4);
        let options = &self.state.options;
        for marker in self.markers.values() {
            frame.lines.push(LinePrimitive::vertical(
                marker.x,
                range_a.min(range_b),
                range_a.max(range_b),
                1.0,
                rule,
            ));
            let radius = if marker.highlighted {
                options.highlight_radius
            } else {
                options.point_radius
            };
            frame
                .circles
                .push(CirclePrimitive::new(marker.x, marker.y, radius, meta.color));
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

impl HoverFind for EventMarkersGenerator {
    fn hover_find(&self, time: f64) -> Option<Rc<DataPoint>> {
        let x = self.state.x_scale()?;
        let index = closest_index_by(time, &self.buffer, |entry| entry.time, None)?;
        let candidate = &self.buffer[index];
        within_pixel_threshold(time, candidate.time, x, self.state.options.hover_threshold_px)
            .then(|| Rc::clone(&candidate.point))
    }
}

impl HoverHighlight for EventMarkersGenerator {
    /// Marks the marker holding this exact point instance, not an equal one.
    fn hover_on(&mut self, point: &Rc<DataPoint>) {
        for marker in self.markers.values_mut() {
            marker.highlighted = Rc::ptr_eq(&marker.point, point);
        }
    }

    fn hover_off(&mut self) {
        for marker in self.markers.values_mut() {
            marker.highlighted = false;
        }
    }

    fn highlighted_count(&self) -> usize {
        self.markers
            .values()
            .filter(|marker| marker.highlighted)
            .count()
    }
}
