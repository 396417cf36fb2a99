//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub pin_file_total: AtomicU64,
    pub pin_json_total: AtomicU64,
    pub pin_success: AtomicU64,
    pub pin_error: AtomicU64,
    pub rejected_method: AtomicU64,
    pub bytes_forwarded: AtomicU64,

    // --- Upstream latency (μs, updated via CAS) ---
    pub upstream_duration_us_sum: AtomicU64,
    pub upstream_duration_us_max: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            pin_file_total: AtomicU64::new(0),
            pin_json_total: AtomicU64::new(0),
            pin_success: AtomicU64::new(0),
            pin_error: AtomicU64::new(0),
            rejected_method: AtomicU64::new(0),
            bytes_forwarded: AtomicU64::new(0),
            upstream_duration_us_sum: AtomicU64::new(0),
            upstream_duration_us_max: AtomicU64::new(0),
        }
    }

    pub fn record_upstream_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.upstream_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.upstream_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.upstream_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let pin_file = self.pin_file_total.load(Ordering::Relaxed);
        let pin_json = self.pin_json_total.load(Ordering::Relaxed);
        let success = self.pin_success.load(Ordering::Relaxed);
        let error = self.pin_error.load(Ordering::Relaxed);
        let rejected = self.rejected_method.load(Ordering::Relaxed);
        let bytes = self.bytes_forwarded.load(Ordering::Relaxed);
        let dur_sum = self.upstream_duration_us_sum.load(Ordering::Relaxed);
        let dur_max = self.upstream_duration_us_max.swap(0, Ordering::Relaxed);

        let dur_sum_s = dur_sum as f64 / 1_000_000.0;
        let dur_max_s = dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP pinning_file_requests_total File pin requests received.\n\
# TYPE pinning_file_requests_total counter\n\
pinning_file_requests_total {pin_file}\n\
# HELP pinning_json_requests_total JSON pin requests received.\n\
# TYPE pinning_json_requests_total counter\n\
pinning_json_requests_total {pin_json}\n\
# HELP pinning_success_total Pins acknowledged by the pinning service.\n\
# TYPE pinning_success_total counter\n\
pinning_success_total {success}\n\
# HELP pinning_error_total Failed pin requests.\n\
# TYPE pinning_error_total counter\n\
pinning_error_total {error}\n\
# HELP pinning_method_not_allowed_total Requests rejected with 405.\n\
# TYPE pinning_method_not_allowed_total counter\n\
pinning_method_not_allowed_total {rejected}\n\
# HELP pinning_bytes_forwarded_total File bytes forwarded upstream.\n\
# TYPE pinning_bytes_forwarded_total counter\n\
pinning_bytes_forwarded_total {bytes}\n\
# HELP pinning_upstream_duration_seconds_sum Total upstream time (seconds).\n\
# TYPE pinning_upstream_duration_seconds_sum counter\n\
pinning_upstream_duration_seconds_sum {dur_sum_s:.6}\n\
# HELP pinning_upstream_duration_seconds_max Max upstream time since last scrape (seconds).\n\
# TYPE pinning_upstream_duration_seconds_max gauge\n\
pinning_upstream_duration_seconds_max {dur_max_s:.6}\n"
        )
    }
}
