use thiserror::Error;

use crate::core::SeriesId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A generator was configured without one of its scales.
    #[error("missing {axis} scale: generators need both scales before drawing")]
    MissingScale { axis: &'static str },

    #[error("unknown series: {0}")]
    UnknownSeries(SeriesId),
}
