//! # Polyphase Rational Resampler
//!
//! Converts the 228 kHz internal MPX stream to the configured output rate
//! using a rational factor `L/M` reduced via `gcd`, and a windowed-sinc
//! lowpass prototype filter (Blackman window) decomposed into `L`
//! polyphase branches so that no samples are wasted computing values the
//! downsample stage would immediately discard.

use std::collections::VecDeque;

/// Taps per polyphase branch. Higher values narrow the transition band at
/// the cost of more multiply-adds per output sample; 48 keeps the
/// 228kHz->192kHz transition band narrow enough for broadcast-quality MPX.
const TAPS_PER_PHASE: usize = 48;

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn blackman(n: usize, len: usize) -> f64 {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    let x = 2.0 * std::f64::consts::PI * n as f64 / (len - 1) as f64;
    a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-9 {
        1.0
    } else {
        (std::f64::consts::PI * x).sin() / (std::f64::consts::PI * x)
    }
}

/// A rational-factor polyphase resampler from `in_rate_hz` to `out_rate_hz`.
pub struct Resampler {
    l: usize,
    m: usize,
    /// `poly[phase][k]` is the `k`-th tap of the `phase`-th polyphase branch.
    poly: Vec<Vec<f32>>,
    history: VecDeque<f32>,
    history_start: u64,
    in_count: u64,
    out_count: u64,
}

impl Resampler {
    pub fn new(in_rate_hz: u32, out_rate_hz: u32) -> Self {
        let g = gcd(in_rate_hz as u64, out_rate_hz as u64);
        let l = (out_rate_hz as u64 / g) as usize;
        let m = (in_rate_hz as u64 / g) as usize;

        let num_taps = TAPS_PER_PHASE * l;
        let cutoff = 0.5 / l.max(m) as f64;
        let center = (num_taps - 1) as f64 / 2.0;
        let mut h = vec![0.0f64; num_taps];
        for (n, v) in h.iter_mut().enumerate() {
            *v = 2.0 * cutoff * sinc(2.0 * cutoff * (n as f64 - center)) * blackman(n, num_taps);
        }

        let mut poly = vec![vec![0f32; TAPS_PER_PHASE]; l];
        for (phase, branch) in poly.iter_mut().enumerate() {
            for (k, coeff) in branch.iter_mut().enumerate() {
                let idx = k * l + phase;
                *coeff = if idx < num_taps { h[idx] as f32 } else { 0.0 };
            }
        }

        Resampler {
            l,
            m,
            poly,
            history: VecDeque::from(vec![0.0; TAPS_PER_PHASE]),
            history_start: 0,
            in_count: TAPS_PER_PHASE as u64,
            out_count: 0,
        }
    }

    pub fn upsample_factor(&self) -> usize {
        self.l
    }

    pub fn downsample_factor(&self) -> usize {
        self.m
    }

    /// Feeds a block of input samples and returns every output sample that
    /// can be produced from the input received so far (across all calls).
    /// Leftover input history is retained for the next call.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        self.history.extend(input.iter().copied());
        self.in_count += input.len() as u64;

        let mut out = Vec::new();
        loop {
            let t = self.out_count * self.m as u64;
            let integer_part = t / self.l as u64;
            let phase = (t % self.l as u64) as usize;

            if integer_part + 1 > self.in_count {
                break;
            }
            if integer_part < TAPS_PER_PHASE as u64 - 1 {
                // Not enough leading history yet (start-up transient).
                self.out_count += 1;
                out.push(0.0);
                continue;
            }

            let branch = &self.poly[phase];
            let mut acc = 0.0f32;
            for (k, &coeff) in branch.iter().enumerate() {
                let abs_idx = integer_part - k as u64;
                let rel = (abs_idx - self.history_start) as usize;
                acc += coeff * self.history[rel];
            }
            out.push(acc);
            self.out_count += 1;
        }

        // Trim history, keeping only the trailing TAPS_PER_PHASE samples
        // relative to the oldest index a future output could still need.
        let keep_from = self
            .in_count
            .saturating_sub(TAPS_PER_PHASE as u64)
            .max(self.history_start);
        let drop = (keep_from - self.history_start) as usize;
        for _ in 0..drop.min(self.history.len().saturating_sub(TAPS_PER_PHASE)) {
            self.history.pop_front();
            self.history_start += 1;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_to_lowest_terms_via_gcd() {
        let r = Resampler::new(228_000, 192_000);
        assert_eq!(r.upsample_factor(), 16);
        assert_eq!(r.downsample_factor(), 19);
    }

    #[test]
    fn output_length_tracks_the_rate_ratio() {
        let mut r = Resampler::new(228_000, 192_000);
        let input = vec![0.5f32; 228_000];
        let mut total_out = 0usize;
        for chunk in input.chunks(4560) {
            total_out += r.process(chunk).len();
        }
        let expected = 228_000 * 192_000 / 228_000;
        // Allow slack for the resampler's internal startup/flush behavior.
        assert!((total_out as i64 - expected as i64).unsigned_abs() < 200);
    }

    #[test]
    fn constant_input_settles_to_a_bounded_constant_output() {
        let mut r = Resampler::new(228_000, 192_000);
        let input = vec![1.0f32; 20_000];
        let out = r.process(&input);
        let tail_avg: f32 = out[out.len() - 100..].iter().sum::<f32>() / 100.0;
        assert!((tail_avg - 1.0).abs() < 0.05);
    }
}
