//! Telemetry helpers for hosts embedding `timechart-rs`.
//!
//! The chart logs series creation, data updates and hover transitions through
//! `tracing`. Nothing is printed unless the host installs a subscriber, either
//! its own or the compact one provided here.

/// Filter used when `RUST_LOG` is unset: chart events at `info`, hover
/// transitions stay quiet.
pub const DEFAULT_FILTER: &str = "timechart_rs=info";

/// Installs a compact subscriber filtered by `RUST_LOG`, or `DEFAULT_FILTER`.
///
/// Returns `false` when the `telemetry` feature is disabled or when the host
/// already set a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_fallback(DEFAULT_FILTER)
}

/// Same as `init_default_tracing` with a caller-chosen fallback directive,
/// e.g. `"timechart_rs=trace"` while debugging hover snapping.
#[must_use]
pub fn init_tracing_with_fallback(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
