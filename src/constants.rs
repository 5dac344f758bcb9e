//! MiniRDS Protocol Constants
//!
//! Constants used throughout the RDS baseband pipeline, based on IEC 62106 /
//! EN 50067 and the ETSI TS 102 980 RDS2 extensions.

/// RDS subcarrier bit rate (bits/second).
pub const RDS_BITRATE_HZ: f64 = 1187.5;

/// Internal MPX generation sample rate. All oscillators, the biphase
/// shaper, and the mixer run at this rate; the resampler converts down
/// (or up) to the configured output rate.
pub const MPX_SAMPLE_RATE_HZ: u32 = 228_000;

/// Default audio output sample rate handed to the resampler and sink.
pub const DEFAULT_OUTPUT_RATE_HZ: u32 = 192_000;

/// Pilot tone frequency (Hz), harmonic 1 of 19 kHz.
pub const PILOT_HZ: f64 = 19_000.0;
/// Stereo DSB-SC subcarrier frequency (Hz), harmonic 2 of 19 kHz.
pub const STEREO_SUBCARRIER_HZ: f64 = 38_000.0;
/// RDS subcarrier frequency (Hz), harmonic 3 of 19 kHz.
pub const RDS_SUBCARRIER_HZ: f64 = 57_000.0;
/// RDS2 stream 1 subcarrier frequency (Hz), harmonic 3.5 of 19 kHz.
pub const RDS2_STREAM1_HZ: f64 = 66_500.0;
/// RDS2 stream 2 subcarrier frequency (Hz), harmonic 3.75 of 19 kHz.
pub const RDS2_STREAM2_HZ: f64 = 71_250.0;
/// RDS2 stream 3 subcarrier frequency (Hz), harmonic 4 of 19 kHz.
pub const RDS2_STREAM3_HZ: f64 = 76_000.0;

/// Mix gain of the 19 kHz pilot tone relative to full-scale MPX.
pub const K_PILOT: f32 = 0.08;
/// Mix gain of the classic RDS subcarrier relative to full-scale MPX.
pub const K_RDS: f32 = 0.045;
/// Default mix gain of each RDS2 subcarrier (0 dB relative to RDS).
pub const K_RDS2_DEFAULT: f32 = K_RDS;

/// Number of bits in one RDS group (4 blocks x 26 bits).
pub const GROUP_BITS: usize = 104;
/// Number of bits in one RDS block (16-bit payload + 10-bit checkword).
pub const BLOCK_BITS: usize = 26;
/// Number of data bits carried by one block.
pub const BLOCK_DATA_BITS: usize = 16;
/// Number of checkword bits carried by one block.
pub const BLOCK_CHECK_BITS: usize = 10;

/// RDS checkword generator polynomial: x^10+x^8+x^7+x^5+x^4+x^3+1, with the
/// implicit x^10 term folded into the LFSR feedback and the remaining
/// coefficients (x^9..x^0) packed into a 10-bit mask.
pub const RDS_CRC_POLY: u16 = 0x1B9;
/// Offset words for blocks A, B, C, C', D (IEC 62106 Annex B).
pub const OFFSET_A: u16 = 0x0FC;
pub const OFFSET_B: u16 = 0x198;
pub const OFFSET_C: u16 = 0x168;
pub const OFFSET_CP: u16 = 0x350;
pub const OFFSET_D: u16 = 0x1B4;

/// Number of glyphs in a Programme Service name.
pub const PS_LEN: usize = 8;
/// Number of glyphs in RadioText.
pub const RT_LEN: usize = 64;
/// Number of glyphs in a PTY Name.
pub const PTYN_LEN: usize = 8;
/// Maximum number of glyphs in Long PS (RDS2).
pub const LPS_MAX_LEN: usize = 32;
/// Maximum number of glyphs in enhanced RadioText (RDS2).
pub const ERT_MAX_LEN: usize = 128;
/// Maximum number of Alternative Frequency entries.
pub const AF_MAX_LEN: usize = 25;
/// Maximum Programme Type code (5-bit field).
pub const PTY_MAX: u8 = 31;

/// Lowest codeable Alternative Frequency, in 100 kHz steps from 87.6 MHz.
pub const AF_BASE_MHZ: f64 = 87.6;
/// AF coding step, in MHz.
pub const AF_STEP_MHZ: f64 = 0.1;
/// Highest codeable AF code value (EN 50067 Annex K).
pub const AF_CODE_MAX: u8 = 204;
/// AF "number of AFs follows" marker base (added to count 1..=25).
pub const AF_COUNT_MARKER_BASE: u8 = 224;

/// RT+ Open Data Application identifier (ETSI TS 102 980), carried in 3A.
pub const RTPLUS_AID: u16 = 0x4BD3;

/// Marks a `Type3A` group as carrying RFT segment bytes directly, rather
/// than announcing an Open Data Application's message group and AID. Both
/// purposes share group type 3A's 5-bit block B specific field, so this
/// value is reserved distinct from the RT+ announcement code (the only
/// other code 3A carries in this crate).
pub const RFT_DATA_MARKER: u16 = 0x1F;

/// Size of one RFT wire segment, in bytes (the payload a complete file
/// transfer is chunked into before being drip-fed across many 3A groups).
pub const RFT_SEGMENT_LEN: usize = 163;

/// Number of output samples the generator loop requests from the MPX
/// pipeline per iteration, sized for roughly 20 ms of audio at the
/// internal 228 kHz rate.
pub const DEFAULT_FRAMES_PER_CHUNK: usize = 4_560; // 228_000 * 0.02

/// Maximum number of queued control commands drained per generator
/// iteration, bounding how long a command flood can delay audio.
pub const MAX_COMMANDS_PER_ITERATION: usize = 64;

/// Default command queue capacity (control tasks -> generator thread).
pub const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Bounded join timeout applied when tearing down control tasks at shutdown.
pub const SHUTDOWN_JOIN_TIMEOUT_MS: u64 = 3_000;

/// Short poll timeout used by control transports when no data is pending.
pub const CONTROL_POLL_TIMEOUT_MS: u64 = 50;
