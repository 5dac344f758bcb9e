//! # Sample Packing
//!
//! Converts floating-point MPX samples into the 16-bit little-endian
//! stereo PCM frames every [`crate::sink::AudioSink`] backend consumes.
//! The composite MPX waveform is a single channel; it is duplicated across
//! left and right so it can be carried by an ordinary stereo audio
//! interface or WAV file into a transmitter's composite/MPX input.

/// Full-scale value a unit-amplitude float sample maps to.
const I16_FULL_SCALE: f32 = i16::MAX as f32;

/// Converts one float sample to a saturating 16-bit signed integer.
#[inline]
pub fn to_i16(sample: f32) -> i16 {
    let scaled = sample * I16_FULL_SCALE;
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Packs a mono MPX buffer into interleaved stereo `i16` frames (L, R, L,
/// R, ...), duplicating each sample across both channels.
pub fn pack_stereo_i16(mpx: &[f32]) -> Vec<i16> {
    let mut out = Vec::with_capacity(mpx.len() * 2);
    for &s in mpx {
        let v = to_i16(s);
        out.push(v);
        out.push(v);
    }
    out
}

/// Packs a mono MPX buffer directly into little-endian stereo byte frames,
/// for sinks that write raw bytes (e.g. a WAV file or named pipe).
pub fn pack_stereo_bytes(mpx: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(mpx.len() * 4);
    for &s in mpx {
        let v = to_i16(s).to_le_bytes();
        out.extend_from_slice(&v);
        out.extend_from_slice(&v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_values_saturate_without_wrapping() {
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-2.0), i16::MIN);
    }

    #[test]
    fn zero_maps_to_zero() {
        assert_eq!(to_i16(0.0), 0);
    }

    #[test]
    fn stereo_packing_duplicates_channels() {
        let mpx = [0.5f32, -0.5];
        let packed = pack_stereo_i16(&mpx);
        assert_eq!(packed.len(), 4);
        assert_eq!(packed[0], packed[1]);
        assert_eq!(packed[2], packed[3]);
    }

    #[test]
    fn byte_packing_is_little_endian() {
        let mpx = [1.0f32];
        let bytes = pack_stereo_bytes(&mpx);
        assert_eq!(bytes.len(), 4);
        let expected = i16::MAX.to_le_bytes();
        assert_eq!(&bytes[0..2], &expected);
    }
}
