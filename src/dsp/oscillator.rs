//! # Phase-Locked Oscillator
//!
//! Every carrier in the MPX mix (pilot, stereo subcarrier, RDS and RDS2
//! subcarriers) is generated by a free-running oscillator built on a 32-bit
//! phase accumulator indexing a precomputed sine table with linear
//! interpolation between entries. Running every carrier off the same
//! accumulator design keeps their phases exactly coherent with the 19 kHz
//! pilot, since each is just a different integer harmonic's phase
//! increment away.

use once_cell::sync::Lazy;

const TABLE_BITS: u32 = 12;
const TABLE_SIZE: usize = 1 << TABLE_BITS;
const INDEX_SHIFT: u32 = 32 - TABLE_BITS;
const QUARTER_TURN: u32 = 1 << 30;

static SINE_TABLE: Lazy<[f32; TABLE_SIZE]> = Lazy::new(|| {
    let mut table = [0f32; TABLE_SIZE];
    for (i, entry) in table.iter_mut().enumerate() {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / TABLE_SIZE as f64;
        *entry = angle.sin() as f32;
    }
    table
});

fn lookup(phase: u32) -> f32 {
    let idx = (phase >> INDEX_SHIFT) as usize;
    let frac_bits = phase & ((1u32 << INDEX_SHIFT) - 1);
    let frac = frac_bits as f32 / (1u64 << INDEX_SHIFT) as f32;
    let a = SINE_TABLE[idx];
    let b = SINE_TABLE[(idx + 1) % TABLE_SIZE];
    a + (b - a) * frac
}

/// A single free-running carrier at a fixed frequency relative to the
/// sample rate it was constructed with.
#[derive(Debug, Clone, Copy)]
pub struct Oscillator {
    phase: u32,
    phase_inc: u32,
}

impl Oscillator {
    pub fn new(freq_hz: f64, sample_rate_hz: u32) -> Self {
        let phase_inc = ((freq_hz / sample_rate_hz as f64) * (1u64 << 32) as f64).round() as u32;
        Oscillator { phase: 0, phase_inc }
    }

    /// Returns `(sin, cos)` of the current phase and advances one sample.
    #[inline]
    pub fn next_sin_cos(&mut self) -> (f32, f32) {
        let sin = lookup(self.phase);
        let cos = lookup(self.phase.wrapping_add(QUARTER_TURN));
        self.phase = self.phase.wrapping_add(self.phase_inc);
        (sin, cos)
    }

    /// Resets the oscillator's phase to zero, used when re-locking all
    /// carriers to a common epoch (e.g. at startup).
    pub fn reset_phase(&mut self) {
        self.phase = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_table_is_bounded() {
        for &v in SINE_TABLE.iter() {
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn oscillator_period_matches_sample_rate_ratio() {
        // A 1000 Hz carrier at 4000 Hz sample rate has a 4-sample period.
        let mut osc = Oscillator::new(1000.0, 4000);
        let first = osc.next_sin_cos();
        for _ in 0..3 {
            osc.next_sin_cos();
        }
        let after_period = osc.next_sin_cos();
        assert!((first.0 - after_period.0).abs() < 1e-3);
        assert!((first.1 - after_period.1).abs() < 1e-3);
    }

    #[test]
    fn sin_cos_are_in_quadrature() {
        let mut osc = Oscillator::new(19_000.0, 228_000);
        for _ in 0..50 {
            let (s, c) = osc.next_sin_cos();
            let magnitude = (s * s + c * c).sqrt();
            assert!((magnitude - 1.0).abs() < 0.02);
        }
    }
}
