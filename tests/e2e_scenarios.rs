//! End-to-end scenarios exercising the public surface the way a control
//! operator or a receiver would observe it: programme-information setters
//! feeding into assembled groups, and the generator loop's own shutdown
//! discipline.

use std::sync::Arc;
use std::time::Duration;

use minirds::generator::{GeneratorConfig, GeneratorLoop};
use minirds::rds::group;
use minirds::rds::rft::RftImage;
use minirds::rds::{GroupSequencer, PiState};
use minirds::sink::WavFileSink;

fn decode_rt(state: &PiState, segments: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(segments * 4);
    for addr in 0..segments {
        let g = group::build_2a(state, addr as u8);
        let c = g.blocks[2].data;
        let d = g.blocks[3].data;
        out.push((c >> 8) as u8);
        out.push((c & 0xFF) as u8);
        out.push((d >> 8) as u8);
        out.push((d & 0xFF) as u8);
    }
    out
}

fn decode_ps(state: &PiState, segments: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(segments * 2);
    for addr in 0..segments {
        let g = group::build_0a(state, addr as u8);
        let d = g.blocks[3].data;
        out.push((d >> 8) as u8);
        out.push((d & 0xFF) as u8);
    }
    out
}

/// Scenario: the default RadioText, reassembled from 16 2A group
/// emissions (4 characters each, covering the full 64-character field),
/// matches the generator's default seed text, space-padded.
#[test]
fn default_radiotext_recovers_across_sixteen_2a_emissions() {
    let config = GeneratorConfig::default();
    let mut state = PiState::new();
    state.set_rt(&config.initial_rt);

    let recovered = decode_rt(&state, 16);
    let text = String::from_utf8(recovered).unwrap();
    let mut expected = config.initial_rt.clone();
    expected.truncate(64);
    while expected.len() < 64 {
        expected.push(' ');
    }
    assert_eq!(text, expected);
}

/// Scenario: a `PS Hello` update applied mid-run is fully recovered within
/// 4 0A group emissions (2 characters each, covering the 8-character PS
/// field), space-padded to the fixed field width.
#[test]
fn ps_update_recovers_within_four_0a_emissions() {
    let mut state = PiState::new();
    state.set_ps("Initial");
    state.set_ps("Hello");

    let recovered = decode_ps(&state, 4);
    assert_eq!(String::from_utf8(recovered).unwrap(), "Hello   ");
}

/// Scenario: setting the Programme Identification code is reflected
/// verbatim in block A of every subsequently assembled group.
#[test]
fn pi_update_is_carried_in_block_a_of_every_group_type() {
    let mut state = PiState::new();
    state.set_pi(0x1ABC);
    state.set_ps("TESTFM");
    state.set_rt("Now playing");

    for group in [
        group::build_0a(&state, 0),
        group::build_2a(&state, 0),
        group::build_10a(&state, 0),
    ] {
        assert_eq!(group.blocks[0].data, 0x1ABC);
    }
}

/// Scenario: an Alternative Frequency list alternates across successive
/// 0A segment addresses, observable in each group's block C.
#[test]
fn af_list_alternates_across_0a_segments() {
    let mut state = PiState::new();
    state.set_af(&[98.1, 101.3, 89.0, 104.5]).unwrap();

    let g0 = group::build_0a(&state, 0);
    let g1 = group::build_0a(&state, 1);

    let af_code = |freq: f64| ((freq - 87.6) / 0.1).round() as u16;
    let expected_c0 = (af_code(98.1) << 8) | af_code(101.3);
    let expected_c1 = (af_code(89.0) << 8) | af_code(104.5);

    assert_eq!(g0.blocks[2].data, expected_c0);
    assert_eq!(g1.blocks[2].data, expected_c1);
    assert_ne!(g0.blocks[2].data, g1.blocks[2].data);
}

/// Scenario: every segment index of an 8 KiB RFT image becomes observable
/// within `ceil(8192/163)+1` emissions of group 3A, the literal bound the
/// RFT cadence is built to satisfy, since segment bytes ride 3A directly
/// rather than a separate same-cadence data group.
#[test]
fn every_rft_segment_index_appears_within_the_spec_bound_of_3a_emissions() {
    let original: Vec<u8> = (0..8192u32).map(|i| (i % 251) as u8).collect();
    let image = Arc::new(RftImage::new(original.clone()));
    let segment_count = image.segment_count();
    let bound = segment_count + 1; // ceil(8192/163) + 1 == 52

    let mut state = PiState::new();
    state.set_rft(RftImage::new(original.clone()));
    let mut seq = GroupSequencer::new(true);
    seq.restart_rft(state.rft().unwrap());

    let mut seen = std::collections::HashSet::new();
    let mut rft_emissions = 0;
    // 3A only lands on 1 in every 8 slots; drive the sequencer generously
    // past that to collect `bound` actual 3A-RFT emissions.
    for _ in 0..(bound * 8 + 16) {
        let g = seq.next(&state);
        if group::is_rft_payload(&g) {
            rft_emissions += 1;
            seen.insert(g.blocks[2].data);
            if rft_emissions >= bound {
                break;
            }
        }
    }

    assert_eq!(rft_emissions, bound);
    assert_eq!(seen.len(), segment_count, "not every segment index surfaced within the bound");
}

/// Scenario: given enough 3A-RFT cycles to let every segment's own byte
/// cursor complete one full pass, the reassembled image round-trips
/// byte-for-byte and its CRC-32 matches, exercised via the same
/// `GroupSequencer` the generator loop drives.
#[test]
fn rft_image_fully_reconstructs_after_one_complete_cycle() {
    let original: Vec<u8> = (0..8192u32).map(|i| (i % 251) as u8).collect();
    let image = Arc::new(RftImage::new(original.clone()));
    let expected_crc = image.crc32;
    let segment_len = image.segment_len;

    let mut state = PiState::new();
    state.set_rft(RftImage::new(original.clone()));
    let mut seq = GroupSequencer::new(true);
    seq.restart_rft(state.rft().unwrap());

    let visits_per_segment = segment_len.div_ceil(2);
    let needed_3a_emissions = image.segment_count() * visits_per_segment;

    let mut chunks = Vec::with_capacity(needed_3a_emissions);
    let mut rft_emissions = 0;
    for _ in 0..(needed_3a_emissions * 8 + 16) {
        let g = seq.next(&state);
        if group::is_rft_payload(&g) {
            let segment_index = g.blocks[2].data;
            let d = g.blocks[3].data;
            chunks.push((segment_index, vec![(d >> 8) as u8, (d & 0xFF) as u8]));
            rft_emissions += 1;
            if rft_emissions >= needed_3a_emissions {
                break;
            }
        }
    }

    let rebuilt = minirds::rds::rft::reassemble(original.len(), segment_len, &chunks);
    assert_eq!(rebuilt, original);
    assert_eq!(minirds::rds::rft::crc32(&rebuilt), expected_crc);
}

/// Scenario: requesting a stop on a freshly-built generator halts `run()`
/// on (effectively) the first iteration rather than hanging, matching the
/// "stop flag halts the generator within one sink-buffer drain" guarantee.
#[test]
fn stop_flag_halts_generator_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stop_test.wav");
    let sink = WavFileSink::create(&path, 48_000).unwrap();

    let config = GeneratorConfig {
        frames_per_chunk: 256,
        output_rate_hz: 48_000,
        ..GeneratorConfig::default()
    };
    let (generator, handle) = GeneratorLoop::new(config, sink).unwrap();

    handle.request_stop();

    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let _ = generator.run();
        let _ = tx.send(());
    });

    rx.recv_timeout(Duration::from_secs(5))
        .expect("generator did not stop promptly after the stop flag was set");
}
