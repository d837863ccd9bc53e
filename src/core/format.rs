use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::FieldValue;
use crate::error::{ChartError, ChartResult};

/// Shown in place of a value that is missing or not numeric.
pub const MISSING_VALUE_GLYPH: &str = "\u{2013}";

/// Maximum number of characters of a series label shown in a tooltip.
pub const MAX_LABEL_CHARS: usize = 30;

/// Decimal places kept before a value is handed to its [`ValueFormat`].
pub const VALUE_ROUNDING_DP: u32 = 3;

pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest precision a [`ValueFormat`] accepts, as in d3-format.
pub const MAX_VALUE_PRECISION: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormatKind {
    /// Shortest representation of the rounded value.
    General,
    /// Fixed number of decimals.
    Fixed,
    /// Rounded to an integer.
    Integer,
    /// Multiplied by 100 with a `%` suffix.
    Percent,
    Exponent,
}

/// Value format parsed from a d3-style spec: `[,][.precision][f|d|%|e]`.
///
/// `""` is the general format, `",.2f"` groups thousands with two decimals,
/// `".1%"` renders `0.1234` as `12.3%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValueFormat {
    pub grouping: bool,
    pub precision: Option<usize>,
    pub kind: ValueFormatKind,
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self {
            grouping: false,
            precision: None,
            kind: ValueFormatKind::General,
        }
    }
}

impl FromStr for ValueFormat {
    type Err = ChartError;

    fn from_str(spec: &str) -> ChartResult<Self> {
        let mut rest = spec.trim();
        let mut format = Self::default();

        if let Some(stripped) = rest.strip_prefix(',') {
            format.grouping = true;
            rest = stripped;
        }

        if let Some(stripped) = rest.strip_prefix('.') {
            let digits: String = stripped.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return Err(ChartError::InvalidData(format!(
                    "value format `{spec}` has a `.` without precision digits"
                )));
            }
            let precision = digits.parse::<usize>().map_err(|e| {
                ChartError::InvalidData(format!("invalid precision in value format `{spec}`: {e}"))
            })?;
            if precision > MAX_VALUE_PRECISION {
                return Err(ChartError::InvalidData(format!(
                    "precision {precision} in value format `{spec}` exceeds {MAX_VALUE_PRECISION}"
                )));
            }
            format.precision = Some(precision);
            rest = &stripped[digits.len()..];
        }

        format.kind = match rest {
            "" => ValueFormatKind::General,
            "f" => ValueFormatKind::Fixed,
            "d" => ValueFormatKind::Integer,
            "%" => ValueFormatKind::Percent,
            "e" => ValueFormatKind::Exponent,
            other => {
                return Err(ChartError::InvalidData(format!(
                    "unsupported value format type `{other}` in `{spec}`"
                )));
            }
        };

        Ok(format)
    }
}

impl TryFrom<String> for ValueFormat {
    type Error = ChartError;

    fn try_from(value: String) -> ChartResult<Self> {
        value.parse()
    }
}

impl From<ValueFormat> for String {
    fn from(value: ValueFormat) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.grouping {
            f.write_str(",")?;
        }
        if let Some(precision) = self.precision {
            write!(f, ".{precision}")?;
        }
        f.write_str(match self.kind {
            ValueFormatKind::General => "",
            ValueFormatKind::Fixed => "f",
            ValueFormatKind::Integer => "d",
            ValueFormatKind::Percent => "%",
            ValueFormatKind::Exponent => "e",
        })
    }
}

impl ValueFormat {
    #[must_use]
    pub fn format(self, value: f64) -> String {
        if !value.is_finite() {
            return MISSING_VALUE_GLYPH.to_owned();
        }
        // Hand-built formats bypass the parse check.
        let precision = self
            .precision
            .map(|precision| precision.min(MAX_VALUE_PRECISION));
        let body = match self.kind {
            ValueFormatKind::General => match precision {
                Some(precision) => format!("{:.*}", precision, value),
                None => format!("{value}"),
            },
            ValueFormatKind::Fixed => format!("{:.*}", precision.unwrap_or(6), value),
            ValueFormatKind::Integer => format!("{}", value.round()),
            ValueFormatKind::Percent => {
                format!("{:.*}", precision.unwrap_or(0), value * 100.0)
            }
            ValueFormatKind::Exponent => format!("{:.*e}", precision.unwrap_or(6), value),
        };
        let body = if self.grouping && self.kind != ValueFormatKind::Exponent {
            group_thousands(&body)
        } else {
            body
        };
        if self.kind == ValueFormatKind::Percent {
            format!("{body}%")
        } else {
            body
        }
    }
}

/// Rounds to [`VALUE_ROUNDING_DP`] places, midpoints away from zero.
#[must_use]
pub fn round_value(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(VALUE_ROUNDING_DP, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Tooltip text for a field value: rounded numbers through `format`,
/// everything else as the placeholder glyph.
#[must_use]
pub fn format_field_value(value: Option<&FieldValue>, format: ValueFormat) -> String {
    match value.and_then(FieldValue::as_number) {
        Some(number) => format.format(round_value(number)),
        None => MISSING_VALUE_GLYPH.to_owned(),
    }
}

/// Truncates `label` to `max_chars` characters, ending with an ellipsis when cut.
#[must_use]
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }
    let mut truncated: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

/// Formats an epoch-millisecond time with a chrono format string.
#[must_use]
pub fn format_time(time_ms: f64, pattern: &str) -> String {
    if !time_ms.is_finite() {
        return MISSING_VALUE_GLYPH.to_owned();
    }
    let Some(time) = DateTime::<Utc>::from_timestamp_millis(time_ms.round() as i64) else {
        return format!("{time_ms}");
    };
    let mut out = String::new();
    if write!(out, "{}", time.format(pattern)).is_err() {
        return format!("{time_ms}");
    }
    out
}

/// Rejects chrono format strings containing unknown specifiers.
pub fn validate_time_format(pattern: &str) -> ChartResult<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ChartError::InvalidData(format!(
            "time format `{pattern}` contains an invalid specifier"
        )));
    }
    Ok(())
}

fn group_thousands(body: &str) -> String {
    let (sign, unsigned) = match body.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", body),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}{fraction}")
}
