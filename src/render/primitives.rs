use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as f64 / 255.0,
            ((hex >> 8) & 0xff) as f64 / 255.0,
            (hex & 0xff) as f64 / 255.0,
        )
    }

    /// Same hue with a different opacity.
    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    pub fn validate(self) -> ChartResult<()> {
        let channels = [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ];
        match channels
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            Some((channel, _)) => Err(ChartError::InvalidData(format!(
                "color channel `{channel}` must be finite and in [0, 1]"
            ))),
            None => Ok(()),
        }
    }
}

/// Category-10 palette; series colors cycle through it by id.
pub const DEFAULT_PALETTE: [Color; 10] = [
    Color::from_hex(0x1f77b4),
    Color::from_hex(0xff7f0e),
    Color::from_hex(0x2ca02c),
    Color::from_hex(0xd62728),
    Color::from_hex(0x9467bd),
    Color::from_hex(0x8c564b),
    Color::from_hex(0xe377c2),
    Color::from_hex(0x7f7f7f),
    Color::from_hex(0xbcbd22),
    Color::from_hex(0x17becf),
];

fn ensure_finite(what: &str, values: &[f64]) -> ChartResult<()> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ChartError::InvalidData(format!("{what} must be finite")))
    }
}

fn ensure_positive(what: &str, value: f64) -> ChartResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ChartError::InvalidData(format!("{what} must be finite and > 0")))
    }
}

/// Stroked segment, used for line paths, event rules and the hover indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            color,
        }
    }

    /// Vertical segment at `x` spanning `top..bottom`.
    #[must_use]
    pub const fn vertical(x: f64, top: f64, bottom: f64, stroke_width: f64, color: Color) -> Self {
        Self::new(x, top, x, bottom, stroke_width, color)
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite("line endpoints", &[self.x1, self.y1, self.x2, self.y2])?;
        ensure_positive("line stroke width", self.stroke_width)?;
        self.color.validate()
    }
}

/// Filled rectangle: time bars and the tooltip panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Color,
}

impl RectPrimitive {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64, fill: Color) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite("rect origin", &[self.x, self.y])?;
        ensure_finite("rect size", &[self.width, self.height])?;
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ChartError::InvalidData(
                "rect size must be >= 0".to_owned(),
            ));
        }
        self.fill.validate()
    }
}

/// Filled circle used for point markers and hover highlights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePrimitive {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Color,
}

impl CirclePrimitive {
    #[must_use]
    pub const fn new(cx: f64, cy: f64, radius: f64, fill: Color) -> Self {
        Self {
            cx,
            cy,
            radius,
            fill,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        ensure_finite("circle center", &[self.cx, self.cy])?;
        ensure_positive("circle radius", self.radius)?;
        self.fill.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// One tooltip text run, anchored at its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            h_align,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.text.is_empty() {
            return Err(ChartError::InvalidData(
                "text run must not be empty".to_owned(),
            ));
        }
        ensure_finite("text anchor", &[self.x, self.y])?;
        ensure_positive("font size", self.font_size_px)?;
        self.color.validate()
    }
}
