//! # Audio Sinks
//!
//! The generator thread's single blocking point: wherever the finished MPX
//! PCM frames leave the process. [`AudioSink`] is deliberately synchronous
//! (not `async_trait`, unlike [`crate::control::ControlTransport`]) since
//! it is always called directly from the dedicated generator
//! `std::thread`, never from the async control-task runtime. Construct a
//! sink from inside that thread (not before spawning it) so backends that
//! hold non-`Send` platform handles (notably [`cpal::Stream`]) never need
//! to cross a thread boundary.

pub mod cpal_sink;
pub mod wav_sink;

pub use cpal_sink::CpalSink;
pub use wav_sink::WavFileSink;

use crate::error::RdsError;

/// Consumes finished, interleaved stereo `i16` PCM frames.
pub trait AudioSink {
    /// Writes `frames` (interleaved L, R, L, R, ...), blocking until the
    /// sink has accepted them.
    fn write_stereo_i16(&mut self, frames: &[i16]) -> Result<(), RdsError>;

    /// The sample rate this sink was opened at.
    fn sample_rate(&self) -> u32;
}

/// Lets the CLI pick a concrete sink at runtime (`CpalSink` vs.
/// `WavFileSink`) and still hand `GeneratorLoop::new` a single monomorphic
/// type.
impl AudioSink for Box<dyn AudioSink> {
    fn write_stereo_i16(&mut self, frames: &[i16]) -> Result<(), RdsError> {
        (**self).write_stereo_i16(frames)
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}
