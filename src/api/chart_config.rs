use serde::{Deserialize, Serialize};

use crate::core::{
    ChartGeometry, DEFAULT_HOVER_THRESHOLD_PX, DEFAULT_TIME_FORMAT, Margins, SeriesKeys, TimeRange,
    ValueFormat, Viewport, validate_time_format,
};
use crate::error::{ChartError, ChartResult};
use crate::generators::{Axis, GeneratorKind, GeneratorOptions};
use crate::interaction::TooltipConfig;
use crate::render::{Color, DEFAULT_PALETTE};

/// Per-series presentation override, applied when the series key `field`
/// renders as `value`.
///
/// When several rules match, each attribute comes from the first rule that
/// sets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRule {
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub kind: Option<GeneratorKind>,
    #[serde(default)]
    pub axis: Option<Axis>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub value_format: Option<ValueFormat>,
}

impl SeriesRule {
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            kind: None,
            axis: None,
            label: None,
            color: None,
            value_format: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: GeneratorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_value_format(mut self, format: ValueFormat) -> Self {
        self.value_format = Some(format);
        self
    }

    #[must_use]
    pub fn matches(&self, keys: &SeriesKeys) -> bool {
        keys.get(&self.field)
            .is_some_and(|value| value.to_string() == self.value)
    }
}

/// Public chart bootstrap configuration.
///
/// Serializable so hosts can persist and load chart setup as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeChartConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default = "default_initial_range")]
    pub initial_range: TimeRange,
    #[serde(default = "default_time_field")]
    pub time_field: String,
    #[serde(default = "default_value_field")]
    pub value_field: String,
    /// When set, this field alone identifies a series.
    #[serde(default)]
    pub key_field: Option<String>,
    #[serde(default)]
    pub fields_to_ignore: Vec<String>,
    #[serde(default = "default_kind")]
    pub default_kind: GeneratorKind,
    #[serde(default)]
    pub series_rules: Vec<SeriesRule>,
    #[serde(default = "default_hover_threshold_px")]
    pub hover_threshold_px: f64,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// Fixed left-axis value domain; autoscaled from data when absent.
    #[serde(default)]
    pub left_domain: Option<(f64, f64)>,
    #[serde(default)]
    pub right_domain: Option<(f64, f64)>,
    #[serde(default)]
    pub default_value_format: ValueFormat,
    /// Colors for series without a rule color, cycled by series id.
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,
    #[serde(default)]
    pub tooltip: TooltipConfig,
    #[serde(default)]
    pub animate_tooltip: bool,
}

fn default_initial_range() -> TimeRange {
    TimeRange {
        start: 0.0,
        end: 60_000.0,
    }
}

fn default_time_field() -> String {
    "time".to_owned()
}

fn default_value_field() -> String {
    "value".to_owned()
}

fn default_kind() -> GeneratorKind {
    GeneratorKind::Line
}

fn default_hover_threshold_px() -> f64 {
    DEFAULT_HOVER_THRESHOLD_PX
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_owned()
}

fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE.to_vec()
}

impl TimeChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            margins: Margins::default(),
            initial_range: default_initial_range(),
            time_field: default_time_field(),
            value_field: default_value_field(),
            key_field: None,
            fields_to_ignore: Vec::new(),
            default_kind: default_kind(),
            series_rules: Vec::new(),
            hover_threshold_px: default_hover_threshold_px(),
            time_format: default_time_format(),
            left_domain: None,
            right_domain: None,
            default_value_format: ValueFormat::default(),
            palette: default_palette(),
            tooltip: TooltipConfig::default(),
            animate_tooltip: false,
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_initial_range(mut self, range: TimeRange) -> Self {
        self.initial_range = range;
        self
    }

    #[must_use]
    pub fn with_time_field(mut self, field: impl Into<String>) -> Self {
        self.time_field = field.into();
        self
    }

    #[must_use]
    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = field.into();
        self
    }

    #[must_use]
    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_ignored_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_ignore
            .extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_default_kind(mut self, kind: GeneratorKind) -> Self {
        self.default_kind = kind;
        self
    }

    #[must_use]
    pub fn with_series_rule(mut self, rule: SeriesRule) -> Self {
        self.series_rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_hover_threshold_px(mut self, threshold_px: f64) -> Self {
        self.hover_threshold_px = threshold_px;
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    #[must_use]
    pub fn with_left_domain(mut self, min: f64, max: f64) -> Self {
        self.left_domain = Some((min, max));
        self
    }

    #[must_use]
    pub fn with_right_domain(mut self, min: f64, max: f64) -> Self {
        self.right_domain = Some((min, max));
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: impl Into<Vec<Color>>) -> Self {
        self.palette = palette.into();
        self
    }

    /// Fallback color for the series with the given id.
    #[must_use]
    pub fn palette_color(&self, id: usize) -> Color {
        match self.palette.len() {
            0 => DEFAULT_PALETTE[id % DEFAULT_PALETTE.len()],
            len => self.palette[id % len],
        }
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: TooltipConfig) -> Self {
        self.tooltip = tooltip;
        self
    }

    #[must_use]
    pub fn with_animated_tooltip(mut self, animate: bool) -> Self {
        self.animate_tooltip = animate;
        self
    }

    /// Options handed to every generator the chart creates.
    #[must_use]
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            time_field: self.time_field.clone(),
            value_field: self.value_field.clone(),
            hover_threshold_px: self.hover_threshold_px,
            ..GeneratorOptions::default()
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        ChartGeometry::new(self.viewport, self.margins)?;
        TimeRange::new(self.initial_range.start, self.initial_range.end)?;

        for (name, value) in [
            ("time_field", &self.time_field),
            ("value_field", &self.value_field),
        ] {
            if value.is_empty() {
                return Err(ChartError::InvalidData(format!("`{name}` must not be empty")));
            }
        }
        if !self.hover_threshold_px.is_finite() || self.hover_threshold_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "hover threshold must be finite and > 0".to_owned(),
            ));
        }
        validate_time_format(&self.time_format)?;

        for (name, domain) in [("left", self.left_domain), ("right", self.right_domain)] {
            if let Some((min, max)) = domain {
                if !min.is_finite() || !max.is_finite() || min >= max {
                    return Err(ChartError::InvalidData(format!(
                        "{name} value domain must be finite with min < max"
                    )));
                }
            }
        }
        if self.palette.is_empty() {
            return Err(ChartError::InvalidData(
                "palette must contain at least one color".to_owned(),
            ));
        }
        for color in self
            .palette
            .iter()
            .copied()
            .chain(self.series_rules.iter().filter_map(|rule| rule.color))
        {
            color.validate()?;
        }
        self.tooltip.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse chart config json: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}
