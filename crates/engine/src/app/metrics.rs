use std::sync::{Arc, Once, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

/// Rates over the last metrics interval. `frame_time_ms` is the mean raw
/// frame delta, before the accumulator clamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

/// Cheaply cloneable handle through which the loop publishes its metrics
/// and the overlay reads them. A poisoned lock is recovered, not propagated;
/// the snapshot is plain data and stays valid either way.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    shared: Arc<RwLock<LoopMetricsSnapshot>>,
}

static POISON_WARNING: Once = Once::new();

fn warn_poisoned(operation: &'static str) {
    POISON_WARNING.call_once(|| {
        warn!(operation, "metrics_lock_poisoned_recovered");
    });
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.shared.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_poisoned("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        match self.shared.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_poisoned("write");
                *poisoned.into_inner() = snapshot;
            }
        }
    }
}

/// Per-interval frame and tick counters owned by the loop thread.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval: Duration,
    window_start: Instant,
    frame_count: u32,
    tick_count: u32,
    frame_seconds_total: f64,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_start: Instant::now(),
            frame_count: 0,
            tick_count: 0,
            frame_seconds_total: 0.0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.frame_seconds_total += frame_dt.as_secs_f64();
    }

    pub(crate) fn record_tick(&mut self) {
        self.tick_count = self.tick_count.saturating_add(1);
    }

    /// Emits a snapshot and starts a new window once the interval has
    /// elapsed; returns `None` mid-window.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f64().max(f64::EPSILON);
        let mean_frame_ms = if self.frame_count == 0 {
            0.0
        } else {
            self.frame_seconds_total / self.frame_count as f64 * 1000.0
        };
        let snapshot = LoopMetricsSnapshot {
            fps: (self.frame_count as f64 / elapsed_seconds) as f32,
            tps: (self.tick_count as f64 / elapsed_seconds) as f32,
            frame_time_ms: mean_frame_ms as f32,
        };

        self.window_start = now;
        self.frame_count = 0;
        self.tick_count = 0;
        self.frame_seconds_total = 0.0;
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn snapshot_reports_rates_over_the_window() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..30 {
            accumulator.record_frame(Duration::from_millis(20));
        }
        for _ in 0..60 {
            accumulator.record_tick();
        }

        let snapshot = accumulator
            .maybe_snapshot(start + Duration::from_secs(1))
            .expect("interval elapsed");
        assert!((snapshot.fps - 30.0).abs() < 0.5);
        assert!((snapshot.tps - 60.0).abs() < 0.5);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.01);
    }

    #[test]
    fn no_snapshot_mid_window_and_counters_reset_after_one() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let start = Instant::now();
        accumulator.record_frame(Duration::from_millis(16));
        assert!(accumulator
            .maybe_snapshot(start + Duration::from_millis(400))
            .is_none());

        accumulator
            .maybe_snapshot(start + Duration::from_secs(1))
            .expect("first window");
        let second = accumulator
            .maybe_snapshot(start + Duration::from_secs(2))
            .expect("second window");
        assert_eq!(second.fps, 0.0);
        assert_eq!(second.frame_time_ms, 0.0);
    }

    #[test]
    fn empty_window_reports_zero_frame_time() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_millis(100));
        let start = Instant::now();
        let snapshot = accumulator
            .maybe_snapshot(start + Duration::from_millis(150))
            .expect("interval elapsed");
        assert_eq!(snapshot.frame_time_ms, 0.0);
        assert_eq!(snapshot.fps, 0.0);
    }

    fn poison(handle: &MetricsHandle) {
        let lock = Arc::clone(&handle.shared);
        let _ = thread::spawn(move || {
            let _guard = lock.write().expect("write guard");
            panic!("poison metrics lock");
        })
        .join();
    }

    #[test]
    fn reads_and_writes_survive_a_poisoned_lock() {
        let handle = MetricsHandle::default();
        poison(&handle);

        assert_eq!(handle.snapshot().fps, 0.0);

        let published = LoopMetricsSnapshot {
            fps: 30.0,
            tps: 60.0,
            frame_time_ms: 12.5,
        };
        handle.publish(published);
        let read_back = handle.snapshot();
        assert_eq!(read_back.fps, published.fps);
        assert_eq!(read_back.tps, published.tps);
        assert_eq!(read_back.frame_time_ms, published.frame_time_ms);
    }
}
