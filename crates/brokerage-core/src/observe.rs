//! Optional metrics instrumentation.
//!
//! With the `observe` feature, routing and projection operations emit
//! counters and histograms via the [`metrics`] crate; the application
//! installs a recorder to collect them. Without the feature every function
//! here is a no-op.

/// Record one routed event.
///
/// - `brokerage.router.routes_total` – counter
/// - `brokerage.router.windows_minted_total` – counter
/// - `brokerage.router.route_duration_seconds` – histogram
#[inline]
pub fn record_route(duration: std::time::Duration, minted: u64) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("brokerage.router.routes_total").increment(1);
        metrics::counter!("brokerage.router.windows_minted_total").increment(minted);
        metrics::histogram!("brokerage.router.route_duration_seconds")
            .record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, minted);
    }
}

/// Record how long the share locks of one event took to acquire.
///
/// - `brokerage.lock.wait_duration_seconds` – histogram
#[inline]
pub fn record_lock_wait(duration: std::time::Duration) {
    #[cfg(feature = "observe")]
    {
        metrics::histogram!("brokerage.lock.wait_duration_seconds").record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = duration;
    }
}

/// Record a price point appended to a window.
///
/// - `brokerage.projection.points_appended_total` – counter
#[inline]
pub fn record_point_appended() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("brokerage.projection.points_appended_total").increment(1);
    }
}
