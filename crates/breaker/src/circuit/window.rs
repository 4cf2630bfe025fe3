//! Rolling window of outcome counts.
//!
//! The window is a ring of buckets, each covering `window / buckets` of time.
//! Time is divided into numbered epochs of one bucket width since the window's
//! origin; an epoch maps onto slot `epoch % buckets`. A slot holding an older
//! epoch is cleared before it is reused, and reads only sum slots whose epoch
//! is still inside the window, so counts decay without a background task.

use super::types::{MetricsSnapshot, Outcome};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    epoch: u64,
    counts: MetricsSnapshot,
}

/// Bucketed, time-decaying outcome counter
#[derive(Debug, Clone)]
pub struct RollingWindow {
    origin: Instant,
    bucket_nanos: u128,
    buckets: Vec<Bucket>,
}

impl RollingWindow {
    /// Create a window spanning `window`, split into `buckets` slots.
    ///
    /// A zero bucket count is treated as one; bucket widths never drop below
    /// one nanosecond.
    pub fn new(origin: Instant, window: Duration, buckets: usize) -> Self {
        let buckets = buckets.max(1);
        let bucket_nanos = (window.as_nanos() / buckets as u128).max(1);
        Self {
            origin,
            bucket_nanos,
            buckets: vec![Bucket::default(); buckets],
        }
    }

    fn epoch(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.origin).as_nanos();
        u64::try_from(elapsed / self.bucket_nanos).unwrap_or(u64::MAX)
    }

    fn is_live(&self, bucket: &Bucket, current: u64) -> bool {
        bucket.epoch <= current && current - bucket.epoch < self.buckets.len() as u64
    }

    /// Count one outcome at `now`.
    ///
    /// An outcome older than the bucket now occupying its slot has already
    /// left the window and is dropped.
    pub fn record(&mut self, now: Instant, outcome: Outcome) {
        let epoch = self.epoch(now);
        let slot = (epoch % self.buckets.len() as u64) as usize;
        let bucket = &mut self.buckets[slot];
        if bucket.epoch > epoch {
            return;
        }
        if bucket.epoch != epoch {
            *bucket = Bucket {
                epoch,
                counts: MetricsSnapshot::default(),
            };
        }
        bucket.counts.record(outcome);
    }

    /// Sum of every bucket still inside the window at `now`
    pub fn counts(&self, now: Instant) -> MetricsSnapshot {
        let current = self.epoch(now);
        self.buckets
            .iter()
            .filter(|bucket| self.is_live(bucket, current))
            .fold(MetricsSnapshot::default(), |mut total, bucket| {
                total.merge(&bucket.counts);
                total
            })
    }

    pub fn total_volume(&self, now: Instant) -> u64 {
        self.counts(now).total_volume()
    }

    pub fn error_rate(&self, now: Instant) -> f64 {
        self.counts(now).error_rate()
    }

    /// Drop every count
    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = Bucket::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> (RollingWindow, Instant) {
        let origin = Instant::now();
        (
            RollingWindow::new(origin, Duration::from_secs(10), 10),
            origin,
        )
    }

    #[test]
    fn test_counts_accumulate_within_window() {
        let (mut window, origin) = window();
        window.record(origin, Outcome::Success);
        window.record(origin + Duration::from_millis(2500), Outcome::Failure);
        window.record(origin + Duration::from_millis(9900), Outcome::Timeout);

        let counts = window.counts(origin + Duration::from_millis(9900));
        assert_eq!(counts.success, 1);
        assert_eq!(counts.failure, 1);
        assert_eq!(counts.timeout, 1);
        assert_eq!(window.total_volume(origin + Duration::from_millis(9900)), 3);
    }

    #[test]
    fn test_old_buckets_decay() {
        let (mut window, origin) = window();
        for _ in 0..5 {
            window.record(origin, Outcome::Failure);
        }
        window.record(origin + Duration::from_secs(4), Outcome::Success);

        // Bucket 0 falls out once epoch 10 begins
        let later = origin + Duration::from_secs(10);
        let counts = window.counts(later);
        assert_eq!(counts.failure, 0);
        assert_eq!(counts.success, 1);

        let much_later = origin + Duration::from_secs(60);
        assert_eq!(window.counts(much_later), MetricsSnapshot::default());
        assert_eq!(window.error_rate(much_later), 0.0);
    }

    #[test]
    fn test_reused_slot_is_cleared() {
        let (mut window, origin) = window();
        window.record(origin, Outcome::Failure);
        // Epoch 10 maps onto the same slot as epoch 0
        let wrapped = origin + Duration::from_secs(10);
        window.record(wrapped, Outcome::Success);

        let counts = window.counts(wrapped);
        assert_eq!(counts.failure, 0);
        assert_eq!(counts.success, 1);
    }

    #[test]
    fn test_stale_record_leaves_newer_bucket_alone() {
        let (mut window, origin) = window();
        let wrapped = origin + Duration::from_secs(10);
        window.record(wrapped, Outcome::Success);
        // Same slot, one full window older
        window.record(origin, Outcome::Failure);

        let counts = window.counts(wrapped);
        assert_eq!(counts.success, 1);
        assert_eq!(counts.failure, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut window, origin) = window();
        window.record(origin, Outcome::Timeout);
        window.record(origin, Outcome::ShortCircuited);
        window.reset();
        assert_eq!(window.counts(origin), MetricsSnapshot::default());
    }

    #[test]
    fn test_degenerate_sizes_are_clamped() {
        let origin = Instant::now();
        let mut window = RollingWindow::new(origin, Duration::ZERO, 0);
        window.record(origin, Outcome::Success);
        assert_eq!(window.counts(origin).success, 1);
    }
}
