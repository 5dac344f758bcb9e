//! # Programme Information State
//!
//! `PiState` is the single mutable store of everything the group sequencer
//! encodes: PI, PS, RadioText, PTY/PTYN, the program flags, AF list, and the
//! RDS2 extension fields (LPS, eRT, RT+ tags, RFT image). It is owned
//! exclusively by the generator thread; every other task reaches it only by
//! sending a [`crate::control::command::Command`] over the control channel,
//! or by reading the [`Params`] snapshot the generator publishes after each
//! mutation.

use std::sync::Arc;

use bitflags::bitflags;
use serde::Serialize;

use crate::constants::{
    AF_BASE_MHZ, AF_CODE_MAX, AF_MAX_LEN, AF_STEP_MHZ, ERT_MAX_LEN, LPS_MAX_LEN, PS_LEN, PTYN_LEN,
    PTY_MAX, RT_LEN,
};
use crate::error::RdsError;
use crate::rds::rft::RftImage;
use crate::rds::xlat::encode_str_fixed;

bitflags! {
    /// Single-bit programme flags carried in block B of every group, plus
    /// the Decoder Identification nibble carried across four 0A groups.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProgramFlags: u8 {
        /// Traffic Program.
        const TP                 = 0b0000_0001;
        /// Traffic Announcement.
        const TA                 = 0b0000_0010;
        /// Music (1) / Speech (0).
        const MS                 = 0b0000_0100;
        /// DI: dynamic PTY indicator.
        const DI_DYNAMIC_PTY     = 0b0000_1000;
        /// DI: compressed audio indicator.
        const DI_COMPRESSED      = 0b0001_0000;
        /// DI: artificial head indicator.
        const DI_ARTIFICIAL_HEAD = 0b0010_0000;
        /// DI: stereo indicator.
        const DI_STEREO          = 0b0100_0000;
    }
}

/// Charset indicator carried alongside enhanced RadioText (RDS2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErtCharset {
    Ucs2,
    Utf8,
}

/// One RT+ tag: a 6-bit content type and a 6-bit start/length pair into the
/// currently-transmitted RadioText. `start + length` must stay within the
/// RadioText field's length (invariant enforced by
/// [`PiState::set_rtplus`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RtPlusTag {
    pub content_type: u8,
    pub start: u8,
    pub length: u8,
}

/// The pair of RT+ tags plus the Item Running/Item Toggle bits that the ODA
/// group carries.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RtPlusTags {
    pub tag1: Option<RtPlusTag>,
    pub tag2: Option<RtPlusTag>,
    pub running: bool,
    pub toggle: bool,
}

/// JSON-serializable snapshot of [`PiState`], published to readers (the
/// instrumentation endpoint, `get_params()` control replies) through an
/// `ArcSwap` after every mutating command.
#[derive(Debug, Clone, Serialize)]
pub struct Params {
    pub pi: u16,
    pub ps: String,
    pub rt: String,
    pub pty: u8,
    pub ptyn: String,
    pub flags_bits: u8,
    pub af: Vec<f64>,
    pub lps: String,
    pub ert: String,
    pub rtplus: RtPlusTags,
    pub rft_len: Option<usize>,
    pub rft_crc32: Option<u32>,
}

/// The full mutable programme-information store.
pub struct PiState {
    pi: u16,
    ps: [u8; PS_LEN],
    ps_ab: bool,
    rt: [u8; RT_LEN],
    rt_ab: bool,
    pty: u8,
    ptyn: [u8; PTYN_LEN],
    ptyn_ab: bool,
    flags: ProgramFlags,
    af: Vec<u8>,
    lps: [u8; LPS_MAX_LEN],
    lps_len: usize,
    ert: Vec<u8>,
    ert_charset: ErtCharset,
    rtplus: RtPlusTags,
    rft: Option<Arc<RftImage>>,
}

impl Default for PiState {
    fn default() -> Self {
        PiState {
            pi: 0x1000,
            ps: [b' '; PS_LEN],
            ps_ab: false,
            rt: [b' '; RT_LEN],
            rt_ab: false,
            pty: 0,
            ptyn: [b' '; PTYN_LEN],
            ptyn_ab: false,
            flags: ProgramFlags::empty(),
            af: Vec::new(),
            lps: [b' '; LPS_MAX_LEN],
            lps_len: 0,
            ert: Vec::new(),
            ert_charset: ErtCharset::Utf8,
            rtplus: RtPlusTags::default(),
            rft: None,
        }
    }
}

impl PiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pi(&self) -> u16 {
        self.pi
    }

    pub fn set_pi(&mut self, pi: u16) {
        self.pi = pi;
    }

    pub fn ps_segment(&self, addr: usize) -> [u8; 2] {
        [self.ps[addr * 2], self.ps[addr * 2 + 1]]
    }

    pub fn set_ps(&mut self, text: &str) {
        let encoded = encode_str_fixed(text, PS_LEN);
        self.ps.copy_from_slice(&encoded);
    }

    pub fn rt_ab(&self) -> bool {
        self.rt_ab
    }

    pub fn rt_segment(&self, addr: usize) -> [u8; 4] {
        let base = addr * 4;
        [
            self.rt[base],
            self.rt[base + 1],
            self.rt[base + 2],
            self.rt[base + 3],
        ]
    }

    /// Replaces the RadioText and flips the A/B flag, which signals
    /// receivers to clear their display and re-buffer the new text.
    pub fn set_rt(&mut self, text: &str) {
        let encoded = encode_str_fixed(text, RT_LEN);
        if encoded != self.rt {
            self.rt.copy_from_slice(&encoded);
            self.rt_ab = !self.rt_ab;
        }
    }

    pub fn pty(&self) -> u8 {
        self.pty
    }

    pub fn set_pty(&mut self, pty: u8) -> Result<(), RdsError> {
        if pty > PTY_MAX {
            return Err(RdsError::Validation {
                field: "pty",
                reason: format!("{pty} exceeds the 5-bit maximum of {PTY_MAX}"),
            });
        }
        self.pty = pty;
        Ok(())
    }

    pub fn ptyn_ab(&self) -> bool {
        self.ptyn_ab
    }

    pub fn ptyn_segment(&self, addr: usize) -> [u8; 4] {
        let base = addr * 4;
        [
            self.ptyn[base],
            self.ptyn[base + 1],
            self.ptyn[base + 2],
            self.ptyn[base + 3],
        ]
    }

    pub fn set_ptyn(&mut self, text: &str) {
        let encoded = encode_str_fixed(text, PTYN_LEN);
        if encoded != self.ptyn {
            self.ptyn.copy_from_slice(&encoded);
            self.ptyn_ab = !self.ptyn_ab;
        }
    }

    pub fn flags(&self) -> ProgramFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: ProgramFlags) {
        self.flags = flags;
    }

    pub fn af_codes(&self) -> &[u8] {
        &self.af
    }

    /// Encodes a list of frequencies (MHz) into AF codes, rejecting any
    /// value outside the codeable 87.6-107.9 MHz range or a list longer
    /// than 25 entries.
    pub fn set_af(&mut self, freqs: &[f64]) -> Result<(), RdsError> {
        if freqs.len() > AF_MAX_LEN {
            return Err(RdsError::Validation {
                field: "af",
                reason: format!("{} entries exceeds the maximum of {AF_MAX_LEN}", freqs.len()),
            });
        }
        let mut codes = Vec::with_capacity(freqs.len());
        for &f in freqs {
            let steps = ((f - AF_BASE_MHZ) / AF_STEP_MHZ).round();
            if steps < 0.0 || steps > AF_CODE_MAX as f64 {
                return Err(RdsError::Validation {
                    field: "af",
                    reason: format!("{f} MHz is not codeable as an AF entry"),
                });
            }
            codes.push(steps as u8);
        }
        self.af = codes;
        Ok(())
    }

    /// Appends one frequency (MHz) to the AF list, rejecting it (and
    /// leaving the list unchanged) if the list is already at its 25-entry
    /// cap or the frequency falls outside the codeable 87.6-107.9 MHz
    /// range.
    pub fn add_af(&mut self, freq_mhz: f64) -> Result<(), RdsError> {
        if self.af.len() >= AF_MAX_LEN {
            return Err(RdsError::Validation {
                field: "af",
                reason: format!("AF list already holds the maximum of {AF_MAX_LEN} entries"),
            });
        }
        let steps = ((freq_mhz - AF_BASE_MHZ) / AF_STEP_MHZ).round();
        if steps < 0.0 || steps > AF_CODE_MAX as f64 {
            return Err(RdsError::Validation {
                field: "af",
                reason: format!("{freq_mhz} MHz is not codeable as an AF entry"),
            });
        }
        self.af.push(steps as u8);
        Ok(())
    }

    /// Empties the AF list (`AFC` on the control wire).
    pub fn clear_af(&mut self) {
        self.af.clear();
    }

    pub fn lps_segment(&self, addr: usize) -> [u8; 4] {
        let base = addr * 4;
        let mut seg = [b' '; 4];
        for i in 0..4 {
            if base + i < self.lps_len {
                seg[i] = self.lps[base + i];
            }
        }
        seg
    }

    pub fn set_lps(&mut self, text: &str) {
        let encoded = encode_str_fixed(text, LPS_MAX_LEN);
        self.lps_len = text.chars().count().min(LPS_MAX_LEN);
        self.lps.copy_from_slice(&encoded);
    }

    pub fn ert(&self) -> &[u8] {
        &self.ert
    }

    pub fn ert_charset(&self) -> ErtCharset {
        self.ert_charset
    }

    pub fn set_ert(&mut self, text: &str, charset: ErtCharset) -> Result<(), RdsError> {
        let bytes: Vec<u8> = match charset {
            ErtCharset::Utf8 => text.as_bytes().to_vec(),
            ErtCharset::Ucs2 => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        };
        if bytes.len() > ERT_MAX_LEN {
            return Err(RdsError::Validation {
                field: "ert",
                reason: format!("{} bytes exceeds the maximum of {ERT_MAX_LEN}", bytes.len()),
            });
        }
        self.ert = bytes;
        self.ert_charset = charset;
        Ok(())
    }

    pub fn rtplus(&self) -> RtPlusTags {
        self.rtplus
    }

    /// Sets the RT+ tag pair, validating that each tag's `start + length`
    /// stays within the current RadioText field and that content types and
    /// offsets fit the 6-bit wire fields. Flips the toggle bit whenever the
    /// tag set actually changes, signalling receivers to refresh.
    pub fn set_rtplus(
        &mut self,
        tag1: Option<RtPlusTag>,
        tag2: Option<RtPlusTag>,
        running: bool,
    ) -> Result<(), RdsError> {
        for tag in [tag1, tag2].into_iter().flatten() {
            if tag.content_type >= 64 || tag.start >= 64 || tag.length >= 64 {
                return Err(RdsError::Validation {
                    field: "rtplus",
                    reason: "content_type, start and length must each fit in 6 bits".into(),
                });
            }
            if tag.start as usize + tag.length as usize >= RT_LEN {
                return Err(RdsError::Validation {
                    field: "rtplus",
                    reason: format!(
                        "tag span {}..{} does not stay strictly within the {RT_LEN}-character RadioText field",
                        tag.start,
                        tag.start as usize + tag.length as usize
                    ),
                });
            }
        }
        let changed = (tag1, tag2) != (self.rtplus.tag1, self.rtplus.tag2);
        self.rtplus = RtPlusTags {
            tag1,
            tag2,
            running,
            toggle: if changed {
                !self.rtplus.toggle
            } else {
                self.rtplus.toggle
            },
        };
        Ok(())
    }

    pub fn rft(&self) -> Option<Arc<RftImage>> {
        self.rft.clone()
    }

    pub fn set_rft(&mut self, image: RftImage) {
        self.rft = Some(Arc::new(image));
    }

    pub fn clear_rft(&mut self) {
        self.rft = None;
    }

    /// Produces the JSON-serializable snapshot published after each
    /// mutating command.
    pub fn snapshot(&self) -> Params {
        Params {
            pi: self.pi,
            ps: String::from_utf8_lossy(&self.ps).trim_end().to_string(),
            rt: String::from_utf8_lossy(&self.rt).trim_end().to_string(),
            pty: self.pty,
            ptyn: String::from_utf8_lossy(&self.ptyn).trim_end().to_string(),
            flags_bits: self.flags.bits(),
            af: self
                .af
                .iter()
                .map(|&code| AF_BASE_MHZ + code as f64 * AF_STEP_MHZ)
                .collect(),
            lps: String::from_utf8_lossy(&self.lps[..self.lps_len]).to_string(),
            ert: match self.ert_charset {
                ErtCharset::Utf8 => String::from_utf8_lossy(&self.ert).to_string(),
                ErtCharset::Ucs2 => String::new(),
            },
            rtplus: self.rtplus,
            rft_len: self.rft.as_ref().map(|r| r.bytes.len()),
            rft_crc32: self.rft.as_ref().map(|r| r.crc32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ps_pads_and_truncates() {
        let mut state = PiState::new();
        state.set_ps("ROCK");
        assert_eq!(&state.ps, b"ROCK    ");
    }

    #[test]
    fn set_rt_flips_ab_only_on_change() {
        let mut state = PiState::new();
        let initial = state.rt_ab();
        state.set_rt("Hello");
        assert_ne!(state.rt_ab(), initial);
        let after_first = state.rt_ab();
        state.set_rt("Hello");
        assert_eq!(state.rt_ab(), after_first);
        state.set_rt("World");
        assert_ne!(state.rt_ab(), after_first);
    }

    #[test]
    fn set_pty_rejects_out_of_range() {
        let mut state = PiState::new();
        assert!(state.set_pty(32).is_err());
        assert!(state.set_pty(31).is_ok());
    }

    #[test]
    fn set_af_encodes_and_rejects_out_of_range() {
        let mut state = PiState::new();
        state.set_af(&[87.6, 107.9, 95.0]).unwrap();
        assert_eq!(state.af_codes(), &[0, 204, 74]);
        assert!(state.set_af(&[87.5]).is_err());
        assert!(state.set_af(&[108.0]).is_err());
    }

    #[test]
    fn add_af_appends_and_caps_at_25() {
        let mut state = PiState::new();
        for i in 0..25 {
            state.add_af(87.6 + i as f64 * 0.1).unwrap();
        }
        assert_eq!(state.af_codes().len(), 25);
        assert!(state.add_af(100.0).is_err());
        state.clear_af();
        assert!(state.af_codes().is_empty());
        state.add_af(100.0).unwrap();
        assert_eq!(state.af_codes().len(), 1);
    }

    #[test]
    fn set_rtplus_rejects_overlong_span() {
        let mut state = PiState::new();
        let bad = RtPlusTag {
            content_type: 4,
            start: 60,
            length: 10,
        };
        assert!(state.set_rtplus(Some(bad), None, true).is_err());
    }

    #[test]
    fn set_rtplus_rejects_span_reaching_exactly_the_field_end() {
        let mut state = PiState::new();
        // start + length == RT_LEN (64) must be rejected: the field holds
        // indices 0..63, so a tag ending exactly at 64 still runs one past it.
        let at_boundary = RtPlusTag {
            content_type: 4,
            start: 60,
            length: 4,
        };
        assert!(state.set_rtplus(Some(at_boundary), None, true).is_err());

        let just_inside = RtPlusTag {
            content_type: 4,
            start: 60,
            length: 3,
        };
        assert!(state.set_rtplus(Some(just_inside), None, true).is_ok());
    }

    #[test]
    fn set_rtplus_toggles_only_on_change() {
        let mut state = PiState::new();
        let tag = RtPlusTag {
            content_type: 4,
            start: 0,
            length: 5,
        };
        state.set_rtplus(Some(tag), None, true).unwrap();
        let first_toggle = state.rtplus().toggle;
        state.set_rtplus(Some(tag), None, true).unwrap();
        assert_eq!(state.rtplus().toggle, first_toggle);
        state.set_rtplus(Some(tag), Some(tag), true).unwrap();
        assert_ne!(state.rtplus().toggle, first_toggle);
    }
}
