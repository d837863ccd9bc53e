use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{ChartGeometry, DataPoint, LinearScale, SeriesId, format_time};
use crate::error::{ChartError, ChartResult};
use crate::generators::{GeneratorKind, TooltipFragment};
use crate::interaction::{HoverEffect, HoverMode, HoverState, PlotBounds, PointerEvent, Tooltip};

use super::SeriesEntry;

pub const HOVER_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Everything one hover pass reads or touches, borrowed from the chart.
///
/// `series` is a slice: the coordinator may update generator highlights but
/// cannot add or remove series.
pub struct HoverContext<'a> {
    pub x_scale: LinearScale,
    pub geometry: ChartGeometry,
    pub series: &'a mut [SeriesEntry],
    pub tooltip: &'a mut Tooltip,
    pub time_format: &'a str,
    pub animate_tooltip: bool,
}

/// Closest point a series reported for the hovered time.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverHit {
    pub series_id: SeriesId,
    pub kind: GeneratorKind,
    pub point: Option<Rc<DataPoint>>,
}

/// Result of the latest hover query.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSelection {
    pub time: f64,
    pub time_label: String,
    pub anchor: (f64, f64),
    /// Visible series in tooltip order, including those with no point.
    pub hits: Vec<HoverHit>,
    pub fragments: Vec<TooltipFragment>,
}

impl HoverSelection {
    #[must_use]
    pub fn hit(&self, series_id: SeriesId) -> Option<&HoverHit> {
        self.hits.iter().find(|hit| hit.series_id == series_id)
    }
}

/// Serializable view of the hover state for host diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverSnapshot {
    pub schema_version: u32,
    pub mode: HoverMode,
    pub time: Option<f64>,
    pub time_label: Option<String>,
    pub fragments: Vec<TooltipFragment>,
}

impl HoverSnapshot {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize hover snapshot: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let snapshot: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse hover snapshot json: {e}"))
        })?;
        if snapshot.schema_version != HOVER_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported hover snapshot schema version: {}",
                snapshot.schema_version
            )));
        }
        Ok(snapshot)
    }
}

/// Keeps pointer state, generator highlights and the tooltip in step.
#[derive(Debug, Clone, Default)]
pub struct HoverCoordinator {
    state: HoverState,
    series_order: Option<Vec<SeriesId>>,
    selection: Option<HoverSelection>,
}

impl HoverCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> HoverMode {
        self.state.mode()
    }

    #[must_use]
    pub fn state(&self) -> HoverState {
        self.state
    }

    #[must_use]
    pub fn selection(&self) -> Option<&HoverSelection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn series_order(&self) -> Option<&[SeriesId]> {
        self.series_order.as_deref()
    }

    /// Sets the in-category tooltip order; series not listed follow the listed ones.
    pub fn set_series_order(&mut self, order: Option<Vec<SeriesId>>) {
        self.series_order = order;
    }

    #[must_use]
    pub fn snapshot(&self) -> HoverSnapshot {
        HoverSnapshot {
            schema_version: HOVER_SNAPSHOT_JSON_SCHEMA_V1,
            mode: self.mode(),
            time: self.selection.as_ref().map(|selection| selection.time),
            time_label: self
                .selection
                .as_ref()
                .map(|selection| selection.time_label.clone()),
            fragments: self
                .selection
                .as_ref()
                .map(|selection| selection.fragments.clone())
                .unwrap_or_default(),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, ctx: HoverContext<'_>) {
        let before = self.state.mode();
        let effect = match event {
            PointerEvent::Enter { x, y } => self.state.on_pointer_enter(x, y),
            PointerEvent::Move { x, y } => self.state.on_pointer_move(x, y),
            PointerEvent::Leave => self.state.on_pointer_leave(),
            PointerEvent::Click => self.state.toggle_pin(),
        };
        if before != self.state.mode() {
            debug!(from = ?before, to = ?self.state.mode(), "hover mode changed");
        }
        self.apply(effect, ctx);
    }

    /// Re-runs the query at the anchor after data or geometry changed.
    pub fn on_chart_changed(&mut self, ctx: HoverContext<'_>) {
        let effect = self.state.on_chart_changed();
        self.apply(effect, ctx);
    }

    fn apply(&mut self, effect: HoverEffect, ctx: HoverContext<'_>) {
        match effect {
            HoverEffect::Refresh => self.refresh(ctx),
            HoverEffect::Clear => Self::clear(&mut self.selection, ctx),
            HoverEffect::Keep => {
                if ctx.tooltip.is_visible() {
                    ctx.tooltip
                        .set_pinned(self.state.mode() == HoverMode::Pinned);
                }
            }
        }
    }

    fn clear(selection: &mut Option<HoverSelection>, ctx: HoverContext<'_>) {
        for entry in ctx.series.iter_mut() {
            if let Some(highlighter) = entry.generator_mut().hover_highlighter() {
                highlighter.hover_off();
            }
        }
        *selection = None;
        ctx.tooltip.hide();
    }

    fn refresh(&mut self, ctx: HoverContext<'_>) {
        let Some(anchor) = self.state.anchor() else {
            Self::clear(&mut self.selection, ctx);
            return;
        };
        let time = ctx.x_scale.invert(anchor.0 - ctx.geometry.margins.left);

        let mut hits: SmallVec<[HoverHit; 8]> = SmallVec::new();
        for entry in ctx.series.iter_mut() {
            let visible = entry.is_visible();
            let point = if visible {
                entry
                    .generator()
                    .hover_finder()
                    .and_then(|finder| finder.hover_find(time))
            } else {
                None
            };
            if let Some(highlighter) = entry.generator_mut().hover_highlighter() {
                match &point {
                    Some(point) => highlighter.hover_on(point),
                    None => highlighter.hover_off(),
                }
            }
            if visible {
                hits.push(HoverHit {
                    series_id: entry.series().id,
                    kind: entry.kind(),
                    point,
                });
            }
        }

        let order = self.series_order.as_deref();
        hits.sort_by_key(|hit| {
            let rank = order.map(|order| {
                order
                    .iter()
                    .position(|id| *id == hit.series_id)
                    .unwrap_or(usize::MAX)
            });
            (hit.kind, rank)
        });

        let mut fragments: Vec<TooltipFragment> = hits
            .iter()
            .filter_map(|hit| {
                let entry = ctx
                    .series
                    .iter()
                    .find(|entry| entry.series().id == hit.series_id)?;
                entry
                    .generator()
                    .tooltip_contents(hit.point.as_deref(), entry.meta())
            })
            .collect();
        let count = fragments.len();
        for (index, fragment) in fragments.iter_mut().enumerate() {
            fragment.is_first = index == 0;
            fragment.is_last = index + 1 == count;
        }

        let time_label = format_time(time, ctx.time_format);
        trace!(time, hits = hits.len(), rows = count, "hover refreshed");

        let geometry = ctx.geometry;
        let bounds = PlotBounds {
            left: 0.0,
            top: 0.0,
            right: geometry.width(),
            bottom: geometry.height(),
        };
        ctx.tooltip.show(
            time_label.clone(),
            fragments.clone(),
            anchor,
            bounds,
            ctx.animate_tooltip,
        );
        ctx.tooltip
            .set_pinned(self.state.mode() == HoverMode::Pinned);

        self.selection = Some(HoverSelection {
            time,
            time_label,
            anchor,
            hits: hits.into_vec(),
            fragments,
        });
    }
}
