//! # Instrumentation
//!
//! Operational visibility into the running generator: cumulative counters
//! and windowed rates ([`stats`]), published read-only via `ArcSwap`
//! alongside the programme-information snapshot.

pub mod stats;

pub use stats::{GeneratorStats, StatsSnapshot, WindowedCounter};
