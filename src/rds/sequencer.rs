//! # Group Sequencer
//!
//! Decides which [`Group`] to emit next, cycling the classic 0A/2A
//! alternation with periodic 10A (PTY Name) slots and, when RDS2 is
//! enabled, 3A (RT+ announcement or RFT data), 15A (RT+ tags) and 11A/12A
//! (LPS/eRT) slots at lower cadences. Priority is evaluated
//! highest-period-bit first so that slots never collide: each condition
//! below fires on a distinct residue class, with the classic 0A/2A
//! alternation as the fallback.

use crate::constants::RTPLUS_AID;
use crate::rds::group::{self, Group};
use crate::rds::pi_state::PiState;
use crate::rds::rft::RftState;

pub struct GroupSequencer {
    slot: u64,
    addr_0a: u8,
    addr_2a: u8,
    addr_10a: u8,
    addr_11a: u8,
    addr_12a: u8,
    rtplus_tag_index: bool,
    rft: Option<RftState>,
    rds2_enabled: bool,
}

impl GroupSequencer {
    pub fn new(rds2_enabled: bool) -> Self {
        GroupSequencer {
            slot: 0,
            addr_0a: 0,
            addr_2a: 0,
            addr_10a: 0,
            addr_11a: 0,
            addr_12a: 0,
            rtplus_tag_index: false,
            rft: None,
            rds2_enabled,
        }
    }

    /// Starts (or restarts) an RFT transmission cycle for a freshly-set
    /// image, resetting the segment cursor to the beginning.
    pub fn restart_rft(&mut self, image: std::sync::Arc<crate::rds::rft::RftImage>) {
        self.rft = Some(RftState::new(image));
    }

    pub fn clear_rft(&mut self) {
        self.rft = None;
    }

    /// Produces the next group to transmit, given the current programme
    /// information. Advances all relevant internal cursors.
    ///
    /// The RDS2 residues nest inside each other (every slot that is `% 16 ==
    /// 15` is also `% 8 == 7`, `% 4 == 3`, etc.), so they're checked from the
    /// largest modulus down to the smallest: a slot takes the rarest
    /// applicable group type, falling back through the less-specific checks
    /// only when the more-specific one has nothing to send.
    pub fn next(&mut self, state: &PiState) -> Group {
        let slot = self.slot;
        self.slot = self.slot.wrapping_add(1);

        if self.rds2_enabled {
            let rtplus_active = state.rtplus().tag1.is_some() || state.rtplus().tag2.is_some();

            if slot % 64 == 63 {
                let addr = self.addr_12a;
                self.addr_12a = (self.addr_12a + 1) % 32;
                return group::build_12a(state, addr);
            }

            if slot % 32 == 31 {
                let addr = self.addr_11a;
                self.addr_11a = (self.addr_11a + 1) % 8;
                return group::build_11a(state, addr);
            }

            if slot % 16 == 15 && rtplus_active {
                let tag_index = self.rtplus_tag_index;
                self.rtplus_tag_index = !self.rtplus_tag_index;
                return group::build_15a(state, tag_index);
            }

            if slot % 8 == 7 {
                if let Some(rft) = self.rft.as_mut() {
                    let (segment_index, chunk) = rft.next_chunk();
                    return group::build_3a_rft(state, segment_index, &chunk);
                } else if rtplus_active {
                    return group::build_3a(
                        state,
                        group::rtplus_message_group_code(),
                        RTPLUS_AID,
                    );
                }
            }
        }

        if slot % 4 == 3 {
            let addr = self.addr_10a;
            self.addr_10a = (self.addr_10a + 1) % 2;
            return group::build_10a(state, addr);
        }

        if slot % 2 == 0 {
            let addr = self.addr_0a;
            self.addr_0a = (self.addr_0a + 1) % 4;
            group::build_0a(state, addr)
        } else {
            let addr = self.addr_2a;
            self.addr_2a = (self.addr_2a + 1) % 16;
            group::build_2a(state, addr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rds::pi_state::RtPlusTag;

    #[test]
    fn classic_schedule_alternates_0a_and_2a() {
        let state = PiState::new();
        let mut seq = GroupSequencer::new(false);
        let kinds: Vec<_> = (0..4)
            .map(|_| seq.next(&state).group_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                crate::rds::group::GroupType::Type0A,
                crate::rds::group::GroupType::Type2A,
                crate::rds::group::GroupType::Type0A,
                crate::rds::group::GroupType::Type10A,
            ]
        );
    }

    #[test]
    fn rft_data_rides_group_3a_directly_when_rds2_enabled() {
        let mut state = PiState::new();
        let image = crate::rds::rft::RftImage::new(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let segment_count = image.segment_count();
        state.set_rft(image);
        let mut seq = GroupSequencer::new(true);
        seq.restart_rft(state.rft().unwrap());

        let mut seen_segments = std::collections::HashSet::new();
        for _ in 0..(segment_count * 8) {
            let group = seq.next(&state);
            if crate::rds::group::is_rft_payload(&group) {
                seen_segments.insert(group.blocks[2].data);
            }
        }
        assert_eq!(seen_segments.len(), segment_count);
    }

    #[test]
    fn rtplus_slots_appear_when_tags_are_set() {
        let mut state = PiState::new();
        state
            .set_rtplus(
                Some(RtPlusTag {
                    content_type: 4,
                    start: 0,
                    length: 5,
                }),
                None,
                true,
            )
            .unwrap();
        let mut seq = GroupSequencer::new(true);

        let mut saw_15a = false;
        for _ in 0..32 {
            if seq.next(&state).group_type == crate::rds::group::GroupType::Type15A {
                saw_15a = true;
            }
        }
        assert!(saw_15a);
    }
}
