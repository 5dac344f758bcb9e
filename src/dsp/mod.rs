//! # DSP Pipeline
//!
//! The signal chain that turns a stream of RDS group bits into the 16-bit
//! PCM frames an [`crate::sink::AudioSink`] writes out: carrier generation
//! ([`oscillator`]), bit shaping ([`biphase`]), composite summation
//! ([`mixer`]), rate conversion ([`resampler`]), and final packing
//! ([`packer`]).

pub mod biphase;
pub mod mixer;
pub mod oscillator;
pub mod packer;
pub mod resampler;

pub use biphase::BiphaseShaper;
pub use mixer::{Mixer, Rds2Input};
pub use oscillator::Oscillator;
pub use resampler::Resampler;
