//! # Generator Statistics
//!
//! Lightweight operational counters the generator thread updates as it
//! runs: groups emitted per type, commands applied and rejected, and a
//! windowed rate counter for groups/second, published alongside the
//! [`crate::rds::Params`] snapshot for the instrumentation endpoint.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Counts events in a sliding time window, used to report approximate
/// per-second rates (e.g. groups emitted) without retaining every event.
pub struct WindowedCounter {
    window: Duration,
    events: VecDeque<Instant>,
}

impl WindowedCounter {
    pub fn new(window: Duration) -> Self {
        WindowedCounter {
            window,
            events: VecDeque::new(),
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.events.push_back(now);
        self.cleanup(now);
    }

    fn cleanup(&mut self, now: Instant) {
        while let Some(&front) = self.events.front() {
            if now.duration_since(front) > self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// Approximate rate of recorded events per second over the window.
    pub fn rate_per_second(&mut self, now: Instant) -> f64 {
        self.cleanup(now);
        self.events.len() as f64 / self.window.as_secs_f64()
    }
}

/// Cumulative, lock-free counters updated from the generator thread.
#[derive(Default)]
pub struct GeneratorStats {
    pub groups_emitted: AtomicU64,
    pub commands_applied: AtomicU64,
    pub commands_rejected: AtomicU64,
    pub rft_segments_sent: AtomicU64,
    pub sink_underruns: AtomicU64,
}

impl GeneratorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_group(&self) {
        self.groups_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_command_applied(&self) {
        self.commands_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_command_rejected(&self) {
        self.commands_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rft_segment(&self) {
        self.rft_segments_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_underrun(&self) {
        self.sink_underruns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            groups_emitted: self.groups_emitted.load(Ordering::Relaxed),
            commands_applied: self.commands_applied.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
            rft_segments_sent: self.rft_segments_sent.load(Ordering::Relaxed),
            sink_underruns: self.sink_underruns.load(Ordering::Relaxed),
        }
    }
}

/// JSON-serializable snapshot of [`GeneratorStats`].
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub groups_emitted: u64,
    pub commands_applied: u64,
    pub commands_rejected: u64,
    pub rft_segments_sent: u64,
    pub sink_underruns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowed_counter_drops_events_outside_the_window() {
        let mut counter = WindowedCounter::new(Duration::from_millis(50));
        let t0 = Instant::now();
        counter.record(t0);
        assert_eq!(counter.rate_per_second(t0) as u64, 20); // 1 event / 0.05s window

        let later = t0 + Duration::from_millis(200);
        assert_eq!(counter.rate_per_second(later), 0.0);
    }

    #[test]
    fn generator_stats_accumulate() {
        let stats = GeneratorStats::new();
        stats.record_group();
        stats.record_group();
        stats.record_command_applied();
        stats.record_command_rejected();

        let snap = stats.snapshot();
        assert_eq!(snap.groups_emitted, 2);
        assert_eq!(snap.commands_applied, 1);
        assert_eq!(snap.commands_rejected, 1);
    }
}
