//! # minirds - a real-time FM MPX baseband generator with RDS/RDS2
//!
//! `minirds` assembles IEC 62106 / EN 50067 RDS group sequences from a live,
//! mutable programme-information model, differentially biphase-encodes them
//! at 1187.5 bit/s, modulates one to four DSB-SC subcarriers phase-locked to
//! a 19 kHz stereo pilot, resamples the 228 kHz composite to an audio output
//! rate, and hands the result to an [`sink::AudioSink`] as 16-bit stereo PCM.
//! A line-oriented ASCII control channel (TCP or named pipe) mutates the
//! programme information while the generator runs.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! minirds = "0.1.0"
//! ```
//!
//! ```rust,no_run
//! use minirds::generator::{GeneratorConfig, GeneratorLoop};
//! use minirds::sink::WavFileSink;
//!
//! let sink = WavFileSink::create("out.wav", 192_000).unwrap();
//! let (generator, handle) = GeneratorLoop::new(GeneratorConfig::default(), sink).unwrap();
//! std::thread::spawn(move || generator.run());
//! handle.request_stop();
//! ```

pub mod constants;
pub mod control;
pub mod dsp;
pub mod error;
pub mod generator;
pub mod instrumentation;
pub mod logging;
pub mod rds;
pub mod sink;

pub use crate::error::RdsError;
pub use crate::generator::{GeneratorConfig, GeneratorHandle, GeneratorLoop};
pub use crate::logging::{init_logger, log_info};
pub use crate::rds::{Params, PiState};
