//! # WAV File Sink
//!
//! Writes MPX PCM to a 16-bit stereo WAV file via `hound`. Used for offline
//! rendering and in the end-to-end test scenarios, where asserting against
//! a file is far simpler than against a live audio device.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::RdsError;

use super::AudioSink;

/// Writes interleaved stereo `i16` PCM to a WAV file on disk.
pub struct WavFileSink {
    writer: WavWriter<std::io::BufWriter<std::fs::File>>,
    sample_rate: u32,
}

impl WavFileSink {
    pub fn create(path: impl AsRef<Path>, sample_rate_hz: u32) -> Result<Self, RdsError> {
        let spec = WavSpec {
            channels: 2,
            sample_rate: sample_rate_hz,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)
            .map_err(|e| RdsError::AudioInit(format!("failed to create WAV file: {e}")))?;
        Ok(WavFileSink {
            writer,
            sample_rate: sample_rate_hz,
        })
    }

    /// Flushes and finalizes the WAV header. Called automatically on drop,
    /// but exposed so callers can surface a write-flush error explicitly.
    pub fn finalize(self) -> Result<(), RdsError> {
        self.writer
            .finalize()
            .map_err(|e| RdsError::SinkFailure(format!("failed to finalize WAV file: {e}")))
    }
}

impl AudioSink for WavFileSink {
    fn write_stereo_i16(&mut self, frames: &[i16]) -> Result<(), RdsError> {
        for &sample in frames {
            self.writer
                .write_sample(sample)
                .map_err(|e| RdsError::SinkFailure(e.to_string()))?;
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_a_readable_wav_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        {
            let mut sink = WavFileSink::create(&path, 192_000).unwrap();
            sink.write_stereo_i16(&[0, 0, 100, -100, i16::MAX, i16::MIN])
                .unwrap();
            sink.finalize().unwrap();
        }
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 192_000);
    }
}
