//! # Live Audio Sink
//!
//! Streams MPX PCM out the host's default audio output device via `cpal`.
//! The generator thread pushes samples into a bounded channel; cpal's
//! realtime callback drains it, substituting silence if the generator
//! falls behind rather than blocking the audio thread.

use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::Mutex;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::RdsError;
use crate::logging::log_error;

use super::AudioSink;

/// A live output stream opened against the host's default audio device.
pub struct CpalSink {
    producer: SyncSender<i16>,
    stream: cpal::Stream,
    sample_rate: u32,
}

impl CpalSink {
    /// Opens the default output device at `sample_rate_hz`, two channels.
    /// Must be called from the thread that will own the returned sink:
    /// the underlying `cpal::Stream` is not moved across threads.
    pub fn new(sample_rate_hz: u32) -> Result<Self, RdsError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| RdsError::AudioInit("no default output device".into()))?;
        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(sample_rate_hz),
            buffer_size: cpal::BufferSize::Default,
        };

        // One second of stereo headroom between the generator and the
        // audio callback.
        let capacity = sample_rate_hz as usize * 2;
        let (producer, consumer) = sync_channel::<i16>(capacity);
        let consumer = Mutex::new(consumer);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [i16], _info: &cpal::OutputCallbackInfo| {
                    let consumer = consumer.lock().expect("cpal callback mutex poisoned");
                    for sample in data.iter_mut() {
                        *sample = consumer.try_recv().unwrap_or(0);
                    }
                },
                |err| log_error(&format!("cpal output stream error: {err}")),
                None,
            )
            .map_err(|e| RdsError::AudioInit(e.to_string()))?;
        stream
            .play()
            .map_err(|e| RdsError::AudioInit(e.to_string()))?;

        Ok(CpalSink {
            producer,
            stream,
            sample_rate: sample_rate_hz,
        })
    }
}

impl AudioSink for CpalSink {
    fn write_stereo_i16(&mut self, frames: &[i16]) -> Result<(), RdsError> {
        for &sample in frames {
            self.producer
                .send(sample)
                .map_err(|_| RdsError::SinkFailure("cpal output stream was dropped".into()))?;
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}
