pub mod format;
pub mod nearest;
pub mod scale;
pub mod series;
pub mod types;
pub mod value;

pub use format::{
    DEFAULT_TIME_FORMAT, MAX_LABEL_CHARS, MAX_VALUE_PRECISION, MISSING_VALUE_GLYPH, ValueFormat,
    ValueFormatKind, format_field_value, format_time, round_value, truncate_label,
    validate_time_format,
};
pub use nearest::{
    DEFAULT_HOVER_THRESHOLD_PX, SearchSide, closest_index, closest_index_by,
    within_pixel_threshold,
};
pub use scale::LinearScale;
pub use series::{Series, SeriesDetector, SeriesId, SeriesKeys};
pub use types::{ChartGeometry, Margins, TimeRange, Viewport};
pub use value::{DataPoint, FieldValue};
