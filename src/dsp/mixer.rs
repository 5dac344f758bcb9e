//! # MPX Mixer
//!
//! Sums the FM multiplex composite signal from its independently-generated
//! components: the mono/stereo program audio, the 19 kHz pilot, the 38 kHz
//! DSB-SC stereo subcarrier, the classic 57 kHz RDS subcarrier, and,
//! optionally, the three RDS2 subcarriers at 66.5/71.25/76 kHz. All
//! carriers share one [`CarrierBank`] so their phases stay locked to the
//! same 19 kHz epoch.
//!
//! Each RDS-family subcarrier simulcasts the same group stream (this crate
//! does not model RDS2's ability to carry independent content per stream);
//! the per-stream gain still lets a caller scale or mute any one of them.

use crate::constants::{
    K_PILOT, K_RDS, PILOT_HZ, RDS2_STREAM1_HZ, RDS2_STREAM2_HZ, RDS2_STREAM3_HZ, RDS_SUBCARRIER_HZ,
    STEREO_SUBCARRIER_HZ,
};
use crate::dsp::oscillator::Oscillator;

/// The six phase-coherent carriers used to build the composite signal.
pub struct CarrierBank {
    pilot: Oscillator,
    stereo: Oscillator,
    rds: Oscillator,
    rds2: [Oscillator; 3],
}

impl CarrierBank {
    pub fn new(sample_rate_hz: u32) -> Self {
        CarrierBank {
            pilot: Oscillator::new(PILOT_HZ, sample_rate_hz),
            stereo: Oscillator::new(STEREO_SUBCARRIER_HZ, sample_rate_hz),
            rds: Oscillator::new(RDS_SUBCARRIER_HZ, sample_rate_hz),
            rds2: [
                Oscillator::new(RDS2_STREAM1_HZ, sample_rate_hz),
                Oscillator::new(RDS2_STREAM2_HZ, sample_rate_hz),
                Oscillator::new(RDS2_STREAM3_HZ, sample_rate_hz),
            ],
        }
    }
}

/// RDS2 per-stream baseband samples and their shared gain.
pub struct Rds2Input {
    pub streams: [f32; 3],
    pub gain: f32,
}

/// Combines one sample's worth of every component into the composite MPX
/// baseband value.
pub struct Mixer {
    carriers: CarrierBank,
}

impl Mixer {
    pub fn new(sample_rate_hz: u32) -> Self {
        Mixer {
            carriers: CarrierBank::new(sample_rate_hz),
        }
    }

    /// `audio_mono` is `L+R`, `audio_stereo_diff` is `L-R` (zero for a
    /// mono-only source). `rds_baseband` is the current classic-RDS
    /// biphase-shaped sample; `rds2` is `None` when the RDS2 feature is
    /// disabled or no RDS2 content is active.
    pub fn mix_sample(
        &mut self,
        audio_mono: f32,
        audio_stereo_diff: f32,
        rds_baseband: f32,
        rds2: Option<Rds2Input>,
    ) -> f32 {
        let (pilot_sin, _) = self.carriers.pilot.next_sin_cos();
        let (stereo_sin, _) = self.carriers.stereo.next_sin_cos();
        let (_, rds_cos) = self.carriers.rds.next_sin_cos();

        let mut mpx =
            audio_mono + K_PILOT * pilot_sin + audio_stereo_diff * stereo_sin + K_RDS * rds_baseband * rds_cos;

        if let Some(Rds2Input { streams, gain }) = rds2 {
            for (osc, &band) in self.carriers.rds2.iter_mut().zip(streams.iter()) {
                let (_, c) = osc.next_sin_cos();
                mpx += gain * band * c;
            }
        }

        mpx
    }
}
