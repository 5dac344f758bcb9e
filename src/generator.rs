//! # Generator Loop
//!
//! Orchestrates the full pipeline every iteration: drains queued control
//! commands into the owned [`PiState`] (never more than
//! [`MAX_COMMANDS_PER_ITERATION`] per iteration, so a command flood cannot
//! starve audio), pulls RDS bits from the [`GroupSequencer`], differentially
//! biphase-shapes them, mixes them onto the phase-locked carrier bank,
//! resamples to the configured output rate, packs to interleaved stereo
//! `i16`, and writes to the [`AudioSink`]. The sink's blocking write is this
//! loop's only suspension point: unlike the rest of this crate's async
//! `tokio` control-path tasks, `GeneratorLoop::run` is driven from a plain
//! `std::thread` so the realtime hot path never waits on the async runtime.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::constants::{
    DEFAULT_FRAMES_PER_CHUNK, DEFAULT_OUTPUT_RATE_HZ, K_RDS2_DEFAULT, MAX_COMMANDS_PER_ITERATION,
    MPX_SAMPLE_RATE_HZ,
};
use crate::control::Command;
use crate::dsp::mixer::Rds2Input;
use crate::dsp::{packer, BiphaseShaper, Mixer, Resampler};
use crate::error::RdsError;
use crate::instrumentation::GeneratorStats;
use crate::logging::{log_error, log_warn};
use crate::rds::{GroupSequencer, Params, PiState};
use crate::sink::AudioSink;

/// Fixed-at-construction configuration, derived from the CLI (`L. CLI
/// configuration`) or test harnesses.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_rate_hz: u32,
    pub frames_per_chunk: usize,
    pub rds2_enabled: bool,
    pub rds2_gain: f32,
    pub initial_pi: u16,
    pub initial_ps: String,
    pub initial_rt: String,
    pub initial_pty: u8,
    pub initial_volume_percent: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_rate_hz: DEFAULT_OUTPUT_RATE_HZ,
            frames_per_chunk: DEFAULT_FRAMES_PER_CHUNK,
            rds2_enabled: cfg!(feature = "rds2"),
            rds2_gain: K_RDS2_DEFAULT,
            initial_pi: 0x1000,
            initial_ps: "MiniRDS ".to_string(),
            initial_rt: "MiniRDS: Software RDS encoder".to_string(),
            initial_pty: 0,
            initial_volume_percent: 100,
        }
    }
}

/// Tracks the current group's 104 transmitted bits and the read cursor
/// into them, re-filling from the sequencer whenever the cursor runs out.
/// Kept as its own field (rather than inlined) so the borrow checker can
/// see it is disjoint from the [`BiphaseShaper`] and [`Mixer`] fields that
/// sit alongside it in [`GeneratorLoop`].
struct BitSource {
    pi_state: PiState,
    sequencer: GroupSequencer,
    current_bits: [u8; 104],
    bit_pos: usize,
}

impl BitSource {
    fn new(pi_state: PiState, sequencer: GroupSequencer) -> Self {
        BitSource {
            pi_state,
            sequencer,
            current_bits: [0u8; 104],
            bit_pos: 104,
        }
    }

    fn next_raw_bit(&mut self, stats: &GeneratorStats) -> u8 {
        if self.bit_pos >= self.current_bits.len() {
            let group = self.sequencer.next(&self.pi_state);
            stats.record_group();
            if crate::rds::group::is_rft_payload(&group) {
                stats.record_rft_segment();
            }
            self.current_bits = group.to_bits();
            self.bit_pos = 0;
        }
        let bit = self.current_bits[self.bit_pos];
        self.bit_pos += 1;
        bit
    }
}

/// A cloneable set of handles into a running [`GeneratorLoop`]: the command
/// channel, the shutdown flag, and the read-only published state. Safe to
/// hand to every control-transport task and to the instrumentation
/// endpoint.
#[derive(Clone)]
pub struct GeneratorHandle {
    commands: SyncSender<Command>,
    stop: Arc<AtomicBool>,
    volume_percent: Arc<AtomicU32>,
    params: Arc<ArcSwap<Params>>,
    stats: Arc<GeneratorStats>,
}

impl GeneratorHandle {
    /// Enqueues a command for the generator thread to apply on its next
    /// iteration. Drops (with a logged warning) if the queue is full or the
    /// generator thread has already exited, matching the "never blocks
    /// audio" discipline: a slow consumer of control input must never back
    /// up onto the realtime thread.
    pub fn send(&self, command: Command) {
        if self.commands.try_send(command).is_err() {
            log_warn("control command dropped: generator queue full or closed");
        }
    }

    /// Requests a clean shutdown; observed by the generator within one
    /// iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Sets the master volume (0..=100 percent), applied immediately on the
    /// next mixed sample rather than waiting for a command-queue drain,
    /// since volume is a continuous gain, not programme-information content
    /// that must stay group-coherent.
    pub fn set_volume_percent(&self, percent: u8) {
        self.volume_percent
            .store(percent.min(100) as u32, Ordering::Relaxed);
    }

    /// Returns the most recently published programme-information snapshot.
    pub fn get_params(&self) -> Arc<Params> {
        self.params.load_full()
    }

    pub fn stats(&self) -> Arc<GeneratorStats> {
        self.stats.clone()
    }
}

/// The realtime generator: owns the only mutable [`PiState`] and the full
/// DSP chain, and drives one [`AudioSink`].
pub struct GeneratorLoop<S: AudioSink> {
    bit_source: BitSource,
    shaper: BiphaseShaper,
    mixer: Mixer,
    resampler: Resampler,
    sink: S,
    commands: Receiver<Command>,
    stop: Arc<AtomicBool>,
    volume_percent: Arc<AtomicU32>,
    params: Arc<ArcSwap<Params>>,
    stats: Arc<GeneratorStats>,
    rds2_enabled: bool,
    rds2_gain: f32,
    frames_per_chunk: usize,
}

impl<S: AudioSink> GeneratorLoop<S> {
    /// Builds a generator and its paired [`GeneratorHandle`], seeding
    /// [`PiState`] from `config`'s initial fields.
    pub fn new(config: GeneratorConfig, sink: S) -> Result<(Self, GeneratorHandle), RdsError> {
        let mut pi_state = PiState::new();
        pi_state.set_pi(config.initial_pi);
        pi_state.set_ps(&config.initial_ps);
        pi_state.set_rt(&config.initial_rt);
        pi_state
            .set_pty(config.initial_pty)
            .map_err(|e| RdsError::RdsInit(e.to_string()))?;

        let sequencer = GroupSequencer::new(config.rds2_enabled);
        let resampler = if config.output_rate_hz == 0 {
            return Err(RdsError::ResamplerInit("output rate must be nonzero".into()));
        } else {
            Resampler::new(MPX_SAMPLE_RATE_HZ, config.output_rate_hz)
        };

        let (tx, rx) = std::sync::mpsc::sync_channel(crate::constants::COMMAND_QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let volume_percent = Arc::new(AtomicU32::new(config.initial_volume_percent.min(100) as u32));
        let stats = Arc::new(GeneratorStats::new());
        let params = Arc::new(ArcSwap::from_pointee(pi_state.snapshot()));

        let handle = GeneratorHandle {
            commands: tx,
            stop: stop.clone(),
            volume_percent: volume_percent.clone(),
            params: params.clone(),
            stats: stats.clone(),
        };

        let generator = GeneratorLoop {
            bit_source: BitSource::new(pi_state, sequencer),
            shaper: BiphaseShaper::new(),
            mixer: Mixer::new(MPX_SAMPLE_RATE_HZ),
            resampler,
            sink,
            commands: rx,
            stop,
            volume_percent,
            params,
            stats,
            rds2_enabled: config.rds2_enabled,
            rds2_gain: config.rds2_gain,
            frames_per_chunk: config.frames_per_chunk,
        };

        Ok((generator, handle))
    }

    /// Runs until `stop` is observed or the sink's write fails. Always
    /// returns `Ok`: a sink failure is logged and ends the loop cleanly
    /// rather than propagating, per the error-handling design's "sink
    /// failure: logged, generator stops cleanly."
    pub fn run(mut self) -> Result<(), RdsError> {
        let mut mpx_buffer = Vec::with_capacity(self.frames_per_chunk);

        loop {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            self.drain_commands();
            self.publish_params();

            mpx_buffer.clear();
            for _ in 0..self.frames_per_chunk {
                mpx_buffer.push(self.next_mpx_sample());
            }

            let resampled = self.resampler.process(&mpx_buffer);
            if resampled.is_empty() {
                continue;
            }

            let packed = packer::pack_stereo_i16(&resampled);
            if let Err(e) = self.sink.write_stereo_i16(&packed) {
                log_error(&format!("sink write failed, stopping generator: {e}"));
                break;
            }
        }

        // Final drain: apply whatever commands arrived just before stop was
        // observed, then publish one last snapshot for any reader still
        // watching after the generator has exited.
        self.drain_commands();
        self.publish_params();
        Ok(())
    }

    fn publish_params(&self) {
        self.params.store(Arc::new(self.bit_source.pi_state.snapshot()));
    }

    fn drain_commands(&mut self) {
        for _ in 0..MAX_COMMANDS_PER_ITERATION {
            match self.commands.try_recv() {
                Ok(command) => self.apply_command(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.stop.store(true, Ordering::Relaxed);
                    break;
                }
            }
        }
    }

    fn apply_command(&mut self, command: Command) {
        let state = &mut self.bit_source.pi_state;
        let result: Result<(), RdsError> = match command {
            Command::SetPi(pi) => {
                state.set_pi(pi);
                Ok(())
            }
            Command::SetPs(ps) => {
                state.set_ps(&ps);
                Ok(())
            }
            Command::SetRt(rt) => {
                state.set_rt(&rt);
                Ok(())
            }
            Command::SetPty(pty) => state.set_pty(pty),
            Command::SetFlags(flags) => {
                state.set_flags(flags);
                Ok(())
            }
            Command::SetAf(freqs) => {
                let mut result = Ok(());
                for freq in freqs {
                    if let Err(e) = state.add_af(freq) {
                        result = Err(e);
                    }
                }
                result
            }
            Command::AddAf(freq) => state.add_af(freq),
            Command::ClearAf => {
                state.clear_af();
                Ok(())
            }
            Command::SetPtyn(ptyn) => {
                state.set_ptyn(&ptyn);
                Ok(())
            }
            Command::SetLps(lps) => {
                state.set_lps(&lps);
                Ok(())
            }
            Command::SetErt(text, charset) => state.set_ert(&text, charset),
            Command::SetRtPlus { tag1, tag2, running } => state.set_rtplus(tag1, tag2, running),
            Command::LoadRftFile(path) => match std::fs::read(&path) {
                Ok(bytes) => {
                    let image = crate::rds::RftImage::new(bytes);
                    state.set_rft(image);
                    self.bit_source
                        .sequencer
                        .restart_rft(state.rft().expect("just set above"));
                    Ok(())
                }
                Err(e) => Err(RdsError::Configuration(format!("reading RFT file {path:?}: {e}"))),
            },
            Command::ClearRft => {
                state.clear_rft();
                self.bit_source.sequencer.clear_rft();
                Ok(())
            }
            Command::SetVolume(percent) => {
                self.volume_percent
                    .store(percent.min(100) as u32, Ordering::Relaxed);
                Ok(())
            }
            Command::Reset => {
                *state = PiState::new();
                self.bit_source.sequencer.clear_rft();
                Ok(())
            }
            Command::GetParams(reply) => {
                let _ = reply.send(state.snapshot());
                Ok(())
            }
            Command::Shutdown => {
                self.stop.store(true, Ordering::Relaxed);
                Ok(())
            }
        };

        match result {
            Ok(()) => self.stats.record_command_applied(),
            Err(e) => {
                log_warn(&format!("control command rejected: {e}"));
                self.stats.record_command_rejected();
            }
        }
    }

    /// Produces one 228 kHz composite MPX sample: pulls/shapes the next RDS
    /// bit, mixes it onto the carrier bank (simulcasting the same biphase
    /// waveform across every enabled RDS2 subcarrier, per
    /// [`crate::dsp::mixer`]'s documented simplification), and applies the
    /// master volume.
    fn next_mpx_sample(&mut self) -> f32 {
        let bit_source = &mut self.bit_source;
        let stats = &self.stats;
        let biphase_sample = self
            .shaper
            .next_sample(|| bit_source.next_raw_bit(stats));

        let rds2 = self.rds2_enabled.then_some(Rds2Input {
            streams: [biphase_sample; 3],
            gain: self.rds2_gain,
        });

        let mpx = self.mixer.mix_sample(0.0, 0.0, biphase_sample, rds2);
        let volume = self.volume_percent.load(Ordering::Relaxed) as f32 / 100.0;
        (mpx * volume).clamp(-1.0, 1.0)
    }
}
