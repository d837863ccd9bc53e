use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Invertible linear mapping between a domain interval and a pixel range.
///
/// The range may be reversed (`range_start > range_end`), which is how y
/// scales put larger values closer to the top of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        let (domain_start, domain_end) = domain;
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        let (range_start, range_end) = range;
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Returns a copy of this scale mapping onto a new pixel range.
    pub fn with_range(self, range: (f64, f64)) -> ChartResult<Self> {
        Self::new(self.domain(), range)
    }

    /// Returns a copy of this scale over a new domain.
    pub fn with_domain(self, domain: (f64, f64)) -> ChartResult<Self> {
        Self::new(domain, self.range())
    }

    /// Maps a domain value to its pixel coordinate.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Maps a pixel coordinate back into the domain.
    ///
    /// A degenerate pixel range inverts to the domain start.
    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    /// Pixels per domain unit (signed by range direction).
    #[must_use]
    pub fn pixels_per_unit(self) -> f64 {
        (self.range_end - self.range_start) / (self.domain_end - self.domain_start)
    }
}
