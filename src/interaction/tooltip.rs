use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::generators::TooltipFragment;
use crate::render::{Color, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipConfig {
    /// Gap between the hovered point and the panel.
    pub offset_px: f64,
    /// Width of the panel's pointer arrow.
    pub arrow_width_px: f64,
    /// Width of the hovered point marker the panel is placed beside.
    pub point_width_px: f64,
    pub char_width_px: f64,
    pub line_height_px: f64,
    pub padding_px: f64,
    pub font_size_px: f64,
    /// Fraction of the remaining distance still left after one second of
    /// animated movement.
    pub remaining_per_second: f64,
    pub snap_distance_px: f64,
    pub background: Color,
    pub text_color: Color,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_px: 10.0,
            arrow_width_px: 6.0,
            point_width_px: 4.0,
            char_width_px: 7.0,
            line_height_px: 16.0,
            padding_px: 8.0,
            font_size_px: 12.0,
            remaining_per_second: 0.001,
            snap_distance_px: 0.5,
            background: Color::rgba(1.0, 1.0, 1.0, 0.92),
            text_color: Color::rgb(0.13, 0.13, 0.13),
        }
    }
}

impl TooltipConfig {
    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [
            (self.offset_px, "offset_px"),
            (self.arrow_width_px, "arrow_width_px"),
            (self.point_width_px, "point_width_px"),
            (self.padding_px, "padding_px"),
            (self.snap_distance_px, "snap_distance_px"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "tooltip config `{name}` must be finite and >= 0"
                )));
            }
        }
        for (value, name) in [
            (self.char_width_px, "char_width_px"),
            (self.line_height_px, "line_height_px"),
            (self.font_size_px, "font_size_px"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "tooltip config `{name}` must be finite and > 0"
                )));
            }
        }
        if !self.remaining_per_second.is_finite() || !(0.0..1.0).contains(&self.remaining_per_second)
        {
            return Err(ChartError::InvalidData(
                "tooltip config `remaining_per_second` must be in [0, 1)".to_owned(),
            ));
        }
        self.background.validate()?;
        self.text_color.validate()?;
        Ok(self)
    }
}

/// Chart bounding box the panel must stay inside, in chart-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TooltipSide {
    /// Right of the cursor.
    Right,
    /// Flipped to the left of the cursor.
    Left,
    /// Neither side fits; pushed in from the right edge.
    InsetRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipLayout {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub side: TooltipSide,
}

/// Places a panel of `panel` size beside `anchor` without leaving `bounds`.
///
/// The panel goes right of the point first, flips left on right overflow,
/// and when the flip overflows the left edge it returns to the right edge,
/// pushed in by its own width plus two arrow widths.
#[must_use]
pub fn place_tooltip(
    anchor: (f64, f64),
    panel: (f64, f64),
    bounds: PlotBounds,
    config: &TooltipConfig,
) -> TooltipLayout {
    let (anchor_x, anchor_y) = anchor;
    let (width, height) = panel;

    let mut left = anchor_x + config.point_width_px + config.offset_px;
    let mut side = TooltipSide::Right;
    if left + width > bounds.right {
        left = anchor_x - config.offset_px - width;
        side = TooltipSide::Left;
        if left < bounds.left {
            left = (bounds.right - (width + 2.0 * config.arrow_width_px)).max(bounds.left);
            side = TooltipSide::InsetRight;
        }
    }

    let top = anchor_y.min(bounds.bottom - height).max(bounds.top);
    TooltipLayout {
        left,
        top,
        width,
        height,
        side,
    }
}

/// Floating hover panel: content, placement, pinned flag and motion.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    config: TooltipConfig,
    visible: bool,
    pinned: bool,
    header: String,
    rows: Vec<TooltipFragment>,
    target: Option<TooltipLayout>,
    position: Option<(f64, f64)>,
}

impl Tooltip {
    pub fn new(config: TooltipConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            visible: false,
            pinned: false,
            header: String::new(),
            rows: Vec::new(),
            target: None,
            position: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    #[must_use]
    pub fn rows(&self) -> &[TooltipFragment] {
        &self.rows
    }

    /// Estimated panel size for the current content.
    #[must_use]
    pub fn panel_size(&self) -> (f64, f64) {
        let widest = self
            .rows
            .iter()
            .map(|row| row.label.chars().count() + row.value.chars().count() + 2)
            .chain(std::iter::once(self.header.chars().count()))
            .max()
            .unwrap_or(0);
        let width = widest as f64 * self.config.char_width_px + 2.0 * self.config.padding_px;
        let lines = self.rows.len() + 1;
        let height = lines as f64 * self.config.line_height_px + 2.0 * self.config.padding_px;
        (width, height)
    }

    /// Replaces the content and moves the panel next to `anchor`.
    ///
    /// With `animate`, the panel glides from its previous position on
    /// subsequent `advance` calls instead of jumping.
    pub fn show(
        &mut self,
        header: String,
        rows: Vec<TooltipFragment>,
        anchor: (f64, f64),
        bounds: PlotBounds,
        animate: bool,
    ) {
        self.header = header;
        self.rows = rows;
        self.visible = true;
        let target = place_tooltip(anchor, self.panel_size(), bounds, &self.config);
        self.target = Some(target);
        if !animate || self.position.is_none() {
            self.position = Some((target.left, target.top));
        }
    }

    /// Hides the panel. Idempotent.
    pub fn hide(&mut self) {
        self.visible = false;
        self.pinned = false;
        self.rows.clear();
        self.header.clear();
        self.target = None;
        self.position = None;
    }

    /// Steps the animated position; returns `true` while still moving.
    pub fn advance(&mut self, delta_seconds: f64) -> ChartResult<bool> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(ChartError::InvalidData(
                "tooltip animation delta must be finite and >= 0".to_owned(),
            ));
        }
        let (Some(target), Some((x, y))) = (self.target, self.position) else {
            return Ok(false);
        };

        let remaining = self.config.remaining_per_second.powf(delta_seconds);
        let next_x = target.left + (x - target.left) * remaining;
        let next_y = target.top + (y - target.top) * remaining;
        let snap = self.config.snap_distance_px;
        if (next_x - target.left).abs() < snap && (next_y - target.top).abs() < snap {
            self.position = Some((target.left, target.top));
            return Ok(false);
        }
        self.position = Some((next_x, next_y));
        Ok(true)
    }

    /// Current placement, at the animated position.
    #[must_use]
    pub fn layout(&self) -> Option<TooltipLayout> {
        let target = self.target?;
        let (left, top) = self.position?;
        Some(TooltipLayout {
            left,
            top,
            ..target
        })
    }

    pub fn draw(&self, frame: &mut RenderFrame) {
        if !self.visible {
            return;
        }
        let Some(layout) = self.layout() else {
            return;
        };
        let config = &self.config;
        let background = if self.pinned {
            config.background.with_alpha(1.0)
        } else {
            config.background
        };
        frame.rects.push(RectPrimitive::new(
            layout.left,
            layout.top,
            layout.width,
            layout.height,
            background,
        ));

        let x = layout.left + config.padding_px;
        let mut y = layout.top + config.padding_px + config.font_size_px;
        if !self.header.is_empty() {
            frame.texts.push(TextPrimitive::new(
                self.header.clone(),
                x,
                y,
                config.font_size_px,
                config.text_color,
                TextHAlign::Left,
            ));
        }
        for row in &self.rows {
            y += config.line_height_px;
            frame.texts.push(TextPrimitive::new(
                format!("{}: {}", row.label, row.value),
                x,
                y,
                config.font_size_px,
                row.color,
                TextHAlign::Left,
            ));
        }
    }
}
