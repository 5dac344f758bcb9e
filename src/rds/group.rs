//! # RDS Group Assembly
//!
//! Builds the four [`Block`]s of a 104-bit RDS group from the current
//! [`PiState`] for a given group type and segment address. Every group
//! carries the same block A (the PI code) and the same block B header
//! (group type, version, TP, PTY, 5 group-specific bits); blocks C and D
//! carry the type-specific payload.
//!
//! Only version A groups are used throughout: this crate never needs the
//! alternate-frequency-in-block-C variant version B enables, so block C
//! always carries the `C` offset word rather than `C'`.

use crate::constants::{RFT_DATA_MARKER, RTPLUS_AID};
use crate::rds::block::{Block, OffsetWord};
use crate::rds::pi_state::PiState;

/// The RDS group types this crate emits. Every variant's wire value is its
/// 4-bit group type code; all are transmitted as version A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    /// Basic tuning and switching information: PS, AF, DI.
    Type0A,
    /// RadioText.
    Type2A,
    /// Open Data Application announcement.
    Type3A,
    /// Programme Type Name.
    Type10A,
    /// Long PS (RDS2).
    Type11A,
    /// Enhanced RadioText (RDS2).
    Type12A,
    /// RT+ tag data, announced via 3A.
    Type15A,
}

impl GroupType {
    fn code(self) -> u8 {
        match self {
            GroupType::Type0A => 0,
            GroupType::Type2A => 2,
            GroupType::Type3A => 3,
            GroupType::Type10A => 10,
            GroupType::Type11A => 11,
            GroupType::Type12A => 12,
            GroupType::Type15A => 15,
        }
    }
}

/// One assembled 104-bit RDS group.
#[derive(Debug, Clone, Copy)]
pub struct Group {
    pub group_type: GroupType,
    pub blocks: [Block; 4],
}

impl Group {
    /// Flattens the group into its 104 transmitted bits, MSB first within
    /// each block, block A through D.
    pub fn to_bits(&self) -> [u8; 104] {
        let mut bits = [0u8; 104];
        for (i, block) in self.blocks.iter().enumerate() {
            bits[i * 26..(i + 1) * 26].copy_from_slice(&block.to_bits());
        }
        bits
    }
}

fn block_b(group_type: GroupType, tp: bool, pty: u8, specific5: u16) -> u16 {
    (group_type.code() as u16) << 12 | (tp as u16) << 10 | (pty as u16) << 5 | (specific5 & 0x1F)
}

fn assemble(group_type: GroupType, pi: u16, b_specific5: u16, tp: bool, pty: u8, c: u16, d: u16) -> Group {
    Group {
        group_type,
        blocks: [
            Block::new(pi, OffsetWord::A),
            Block::new(block_b(group_type, tp, pty, b_specific5), OffsetWord::B),
            Block::new(c, OffsetWord::C),
            Block::new(d, OffsetWord::D),
        ],
    }
}

/// Builds a 0A group (basic tuning/AF/PS) for PS segment `addr` (0..=3).
pub fn build_0a(state: &PiState, addr: u8) -> Group {
    let flags = state.flags();
    let ta = flags.contains(crate::rds::pi_state::ProgramFlags::TA);
    let ms = flags.contains(crate::rds::pi_state::ProgramFlags::MS);
    let di_bit = match addr {
        0 => flags.contains(crate::rds::pi_state::ProgramFlags::DI_DYNAMIC_PTY),
        1 => flags.contains(crate::rds::pi_state::ProgramFlags::DI_COMPRESSED),
        2 => flags.contains(crate::rds::pi_state::ProgramFlags::DI_ARTIFICIAL_HEAD),
        _ => flags.contains(crate::rds::pi_state::ProgramFlags::DI_STEREO),
    };
    let specific5 = ((ta as u16) << 4) | ((ms as u16) << 3) | ((di_bit as u16) << 2) | (addr as u16 & 0x3);

    let af = state.af_codes();
    let (af1, af2) = if af.is_empty() {
        (205u8, 205u8) // "filler" code: no AF announced
    } else {
        let base = (addr as usize * 2) % af.len().max(1);
        (af[base], af.get(base + 1).copied().unwrap_or(af[0]))
    };
    let c = (af1 as u16) << 8 | af2 as u16;
    let ps = state.ps_segment(addr as usize);
    let d = (ps[0] as u16) << 8 | ps[1] as u16;

    assemble(
        GroupType::Type0A,
        state.pi(),
        specific5,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        c,
        d,
    )
}

/// Builds a 2A group (RadioText) for text segment `addr` (0..=15).
pub fn build_2a(state: &PiState, addr: u8) -> Group {
    let specific5 = ((state.rt_ab() as u16) << 4) | (addr as u16 & 0xF);
    let seg = state.rt_segment(addr as usize);
    let c = (seg[0] as u16) << 8 | seg[1] as u16;
    let d = (seg[2] as u16) << 8 | seg[3] as u16;
    let flags = state.flags();
    assemble(
        GroupType::Type2A,
        state.pi(),
        specific5,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        c,
        d,
    )
}

/// Builds a 10A group (PTY Name) for segment `addr` (0 or 1).
pub fn build_10a(state: &PiState, addr: u8) -> Group {
    let specific5 = ((state.ptyn_ab() as u16) << 4) | (addr as u16 & 0x1);
    let seg = state.ptyn_segment(addr as usize);
    let c = (seg[0] as u16) << 8 | seg[1] as u16;
    let d = (seg[2] as u16) << 8 | seg[3] as u16;
    let flags = state.flags();
    assemble(
        GroupType::Type10A,
        state.pi(),
        specific5,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        c,
        d,
    )
}

/// Builds an 11A group (Long PS, RDS2) for segment `addr` (0..=7).
pub fn build_11a(state: &PiState, addr: u8) -> Group {
    let specific5 = addr as u16 & 0x7;
    let seg = state.lps_segment(addr as usize);
    let c = (seg[0] as u16) << 8 | seg[1] as u16;
    let d = (seg[2] as u16) << 8 | seg[3] as u16;
    let flags = state.flags();
    assemble(
        GroupType::Type11A,
        state.pi(),
        specific5,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        c,
        d,
    )
}

/// Builds a 12A group (enhanced RadioText, RDS2) for segment `addr`
/// (0..=31). Segment 0's first byte is repurposed to carry the charset
/// indicator (0 = UCS-2, 1 = UTF-8) rather than a text byte.
pub fn build_12a(state: &PiState, addr: u8) -> Group {
    let specific5 = addr as u16 & 0x1F;
    let ert = state.ert();
    let base = addr as usize * 4;
    let mut seg = [b' '; 4];
    for i in 0..4 {
        if base + i < ert.len() {
            seg[i] = ert[base + i];
        }
    }
    if addr == 0 {
        seg[0] = match state.ert_charset() {
            crate::rds::pi_state::ErtCharset::Ucs2 => 0,
            crate::rds::pi_state::ErtCharset::Utf8 => 1,
        };
    }
    let c = (seg[0] as u16) << 8 | seg[1] as u16;
    let d = (seg[2] as u16) << 8 | seg[3] as u16;
    let flags = state.flags();
    assemble(
        GroupType::Type12A,
        state.pi(),
        specific5,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        c,
        d,
    )
}

/// Builds a 3A group announcing an Open Data Application: `message_group`
/// is the 5-bit `(type << 1 | version)` code of the group carrying that
/// application's payload, `aid` its registered application identifier.
pub fn build_3a(state: &PiState, message_group: u8, aid: u16) -> Group {
    let flags = state.flags();
    assemble(
        GroupType::Type3A,
        state.pi(),
        message_group as u16 & 0x1F,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        0,
        aid,
    )
}

/// The 5-bit `(type << 1 | version)` code 3A uses to announce 15A (RT+).
pub fn rtplus_message_group_code() -> u8 {
    (GroupType::Type15A.code() << 1) | 0 // version A
}

/// The RT+ Open Data Application identifier, for 3A announcements.
pub fn rtplus_aid() -> u16 {
    RTPLUS_AID
}

/// Builds a 15A group carrying one RT+ tag. `tag_index` selects tag1
/// (false) or tag2 (true); successive calls alternate to cover both tags.
pub fn build_15a(state: &PiState, tag_index: bool) -> Group {
    let rtplus = state.rtplus();
    let tag = if tag_index { rtplus.tag2 } else { rtplus.tag1 };
    let specific5 = ((rtplus.running as u16) << 4)
        | ((rtplus.toggle as u16) << 3)
        | ((tag_index as u16) << 2);
    let (c, d) = match tag {
        Some(t) => {
            let packed = (t.content_type as u32) << 12 | (t.start as u32) << 6 | t.length as u32;
            let c = (packed >> 2) as u16;
            let d = ((packed & 0x3) as u16) << 14;
            (c, d)
        }
        None => (0, 0),
    };
    let flags = state.flags();
    assemble(
        GroupType::Type15A,
        state.pi(),
        specific5,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        c,
        d,
    )
}

/// Builds a 3A group carrying one RFT wire chunk directly, rather than
/// announcing an ODA: block C carries `segment_index`, block D carries up
/// to two raw payload bytes, and block B's specific bits are set to
/// [`RFT_DATA_MARKER`] so [`is_rft_payload`] can tell this apart from an
/// ODA-announcement 3A group sharing the same group type.
pub fn build_3a_rft(state: &PiState, segment_index: u16, chunk: &[u8]) -> Group {
    let mut bytes = [0u8; 2];
    bytes[..chunk.len().min(2)].copy_from_slice(&chunk[..chunk.len().min(2)]);
    let d = (bytes[0] as u16) << 8 | bytes[1] as u16;
    let flags = state.flags();
    assemble(
        GroupType::Type3A,
        state.pi(),
        RFT_DATA_MARKER,
        flags.contains(crate::rds::pi_state::ProgramFlags::TP),
        state.pty(),
        segment_index,
        d,
    )
}

/// True when `group` is a `Type3A` emission built by [`build_3a_rft`]
/// (carrying RFT segment bytes) rather than an ODA announcement built by
/// [`build_3a`].
pub fn is_rft_payload(group: &Group) -> bool {
    group.group_type == GroupType::Type3A && (group.blocks[1].data & 0x1F) == RFT_DATA_MARKER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rds::pi_state::PiState;

    #[test]
    fn every_block_in_an_assembled_group_verifies() {
        let mut state = PiState::new();
        state.set_ps("TESTFM");
        state.set_pi(0x3ABC);

        for group in [
            build_0a(&state, 0),
            build_2a(&state, 0),
            build_10a(&state, 0),
            build_11a(&state, 0),
            build_12a(&state, 0),
            build_3a(&state, rtplus_message_group_code(), rtplus_aid()),
            build_15a(&state, false),
            build_3a_rft(&state, 0, &[0xAA, 0xBB]),
        ] {
            let offsets = [
                OffsetWord::A,
                OffsetWord::B,
                OffsetWord::C,
                OffsetWord::D,
            ];
            for (block, offset) in group.blocks.iter().zip(offsets) {
                assert!(crate::rds::block::verify(
                    block.data,
                    block.checkword,
                    offset
                ));
            }
        }
    }

    #[test]
    fn group_bits_are_104_long() {
        let state = PiState::new();
        assert_eq!(build_0a(&state, 0).to_bits().len(), 104);
    }

    #[test]
    fn block_a_always_carries_the_pi_code() {
        let mut state = PiState::new();
        state.set_pi(0xBEEF);
        let group = build_2a(&state, 3);
        assert_eq!(group.blocks[0].data, 0xBEEF);
    }

    #[test]
    fn is_rft_payload_distinguishes_the_two_roles_group_3a_carries() {
        let state = PiState::new();
        let announcement = build_3a(&state, rtplus_message_group_code(), rtplus_aid());
        let rft_data = build_3a_rft(&state, 7, &[0xAA, 0xBB]);
        assert!(!is_rft_payload(&announcement));
        assert!(is_rft_payload(&rft_data));
    }
}
