use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Space reserved around the plot area for axes and labels, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 40.0,
            bottom: 20.0,
            left: 40.0,
        }
    }
}

impl Margins {
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (name, value) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "margin `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}

/// Pixel geometry of a chart: full surface size plus plot margins.
///
/// All pixel coordinates handled by the chart are relative to the chart's
/// own origin (top-left corner of the surface).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    pub viewport: Viewport,
    pub margins: Margins,
}

impl ChartGeometry {
    pub fn new(viewport: Viewport, margins: Margins) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let margins = margins.validate()?;
        let geometry = Self { viewport, margins };
        if geometry.plot_width() <= 0.0 || geometry.plot_height() <= 0.0 {
            return Err(ChartError::InvalidData(
                "margins leave no room for the plot area".to_owned(),
            ));
        }
        Ok(geometry)
    }

    #[must_use]
    pub fn plot_width(self) -> f64 {
        f64::from(self.viewport.width) - self.margins.left - self.margins.right
    }

    #[must_use]
    pub fn plot_height(self) -> f64 {
        f64::from(self.viewport.height) - self.margins.top - self.margins.bottom
    }

    #[must_use]
    pub fn width(self) -> f64 {
        f64::from(self.viewport.width)
    }

    #[must_use]
    pub fn height(self) -> f64 {
        f64::from(self.viewport.height)
    }
}

/// Fully visible draw range in domain units (epoch milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> ChartResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ChartError::InvalidData(
                "time range bounds must be finite".to_owned(),
            ));
        }
        if end <= start {
            return Err(ChartError::InvalidData(
                "time range end must be greater than start".to_owned(),
            ));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.end - self.start
    }
}
