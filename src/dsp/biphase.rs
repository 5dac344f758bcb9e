//! # Differential Biphase Shaping
//!
//! Shapes the raw RDS bitstream into the filtered baseband waveform that
//! modulates the 57 kHz (and RDS2) subcarriers: each bit is first
//! differentially encoded (XORed against the previous differential bit, so
//! a `1` causes a polarity reversal and a `0` does not), then rendered as a
//! signed copy of a shared pulse added into an overlap-add buffer.
//!
//! The pulse spans roughly three bit periods (576 samples at the 228 kHz
//! internal rate, `ceil(3 * 228000 / 1187.5)`), its own bit period carrying
//! most of its energy with Hann-tapered tails bleeding into the next two —
//! a deliberately simple stand-in for the raised-cosine matched filter a
//! hardware RDS encoder would use, tuned to keep the occupied bandwidth
//! narrow without needing an explicit FIR convolution at runtime.

use std::collections::VecDeque;

use once_cell::sync::Lazy;

use crate::constants::{MPX_SAMPLE_RATE_HZ, RDS_BITRATE_HZ};

/// Pulse length in samples: `ceil(3 * sample_rate / bitrate)`.
pub const PULSE_LEN: usize = 576;

static PULSE_TABLE: Lazy<[f32; PULSE_LEN]> = Lazy::new(|| {
    let samples_per_bit = MPX_SAMPLE_RATE_HZ as f64 / RDS_BITRATE_HZ;
    let mut table = [0f32; PULSE_LEN];
    for (i, v) in table.iter_mut().enumerate() {
        let biphase = (std::f64::consts::PI * i as f64 / samples_per_bit).sin();
        let window =
            0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (PULSE_LEN - 1) as f64).cos();
        *v = (biphase * window) as f32;
    }
    table
});

/// Streaming differential biphase shaper: pulls raw bits lazily as the bit
/// clock crosses each boundary and overlap-adds the shaped pulse into a
/// ring buffer sized to the pulse length.
pub struct BiphaseShaper {
    buffer: VecDeque<f32>,
    samples_per_bit: f64,
    out_index: u64,
    bit_index: u64,
    last_diff: u8,
}

impl BiphaseShaper {
    pub fn new() -> Self {
        BiphaseShaper {
            buffer: VecDeque::from(vec![0.0; PULSE_LEN]),
            samples_per_bit: MPX_SAMPLE_RATE_HZ as f64 / RDS_BITRATE_HZ,
            out_index: 0,
            bit_index: 0,
            last_diff: 0,
        }
    }

    /// Produces the next output sample, pulling a new raw bit from
    /// `next_bit` exactly when the bit clock crosses a boundary.
    pub fn next_sample(&mut self, mut next_bit: impl FnMut() -> u8) -> f32 {
        let next_boundary = (self.bit_index as f64 * self.samples_per_bit).round() as u64;
        if self.out_index == next_boundary {
            let raw = next_bit() & 1;
            let diff = raw ^ self.last_diff;
            self.last_diff = diff;
            let sign = if diff == 1 { 1.0 } else { -1.0 };
            for (slot, &pulse) in self.buffer.iter_mut().zip(PULSE_TABLE.iter()) {
                *slot += sign * pulse;
            }
            self.bit_index += 1;
        }
        let sample = self.buffer.pop_front().expect("buffer holds PULSE_LEN slots");
        self.buffer.push_back(0.0);
        self.out_index += 1;
        sample
    }
}

impl Default for BiphaseShaper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_zero_bits_hold_a_fixed_polarity() {
        let mut shaper = BiphaseShaper::new();
        let mut energy = 0.0f32;
        for _ in 0..4000 {
            energy += shaper.next_sample(|| 0).abs();
        }
        // All-zero input never flips the differential bit, so the shaper
        // keeps emitting signal (a constant carrier), not silence.
        assert!(energy > 0.0);
    }

    #[test]
    fn alternating_bits_produce_bounded_output() {
        let mut shaper = BiphaseShaper::new();
        let mut toggle = 0u8;
        for _ in 0..4000 {
            let sample = shaper.next_sample(|| {
                toggle ^= 1;
                toggle
            });
            assert!(sample.abs() < 4.0);
        }
    }

    #[test]
    fn pulse_table_starts_and_ends_near_zero() {
        assert!(PULSE_TABLE[0].abs() < 1e-6);
        assert!(PULSE_TABLE[PULSE_LEN - 1].abs() < 1e-2);
    }
}
