//! 16-bit PCM wire encoder
//!
//! Quantizes f32 chunks to little-endian signed 16-bit samples for the
//! outbound envelope.

use bytes::{BufMut, BytesMut};

use crate::constants::PCM16_SCALE;

/// Quantize one sample
///
/// Input is clamped to `[-1.0, 1.0]` and scaled by 32767, so `-1.0` maps to
/// `-32767` rather than `-32768`. Halfway values round away from zero.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * PCM16_SCALE).round() as i16
}

/// Append `samples` to `out` as 16-bit little-endian PCM
pub fn encode_into(samples: &[f32], out: &mut BytesMut) {
    out.reserve(samples.len() * 2);
    for &s in samples {
        out.put_i16_le(quantize(s));
    }
}

/// PCM16 encoder with statistics
pub struct Pcm16Encoder {
    /// Chunks encoded
    chunks_encoded: u64,
    /// Samples encoded across all chunks
    samples_encoded: u64,
    /// Samples outside `[-1.0, 1.0]` that were clamped
    clipped_samples: u64,
}

impl Pcm16Encoder {
    pub fn new() -> Self {
        Self {
            chunks_encoded: 0,
            samples_encoded: 0,
            clipped_samples: 0,
        }
    }

    /// Encode a chunk, replacing the contents of `out`
    ///
    /// `out` keeps its allocation between calls.
    pub fn encode(&mut self, samples: &[f32], out: &mut BytesMut) {
        out.clear();
        self.clipped_samples += samples.iter().filter(|s| s.abs() > 1.0).count() as u64;
        encode_into(samples, out);
        self.chunks_encoded += 1;
        self.samples_encoded += samples.len() as u64;
    }

    /// Get statistics
    pub fn stats(&self) -> EncoderStats {
        EncoderStats {
            chunks_encoded: self.chunks_encoded,
            samples_encoded: self.samples_encoded,
            clipped_samples: self.clipped_samples,
        }
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.chunks_encoded = 0;
        self.samples_encoded = 0;
        self.clipped_samples = 0;
    }
}

impl Default for Pcm16Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoder statistics
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderStats {
    pub chunks_encoded: u64,
    pub samples_encoded: u64,
    pub clipped_samples: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quantize_reference_points() {
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32767);
        assert_eq!(quantize(0.5), 16384);
        assert_eq!(quantize(-0.5), -16384);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(quantize(3.0), 32767);
        assert_eq!(quantize(-3.0), -32767);

        let mut encoder = Pcm16Encoder::new();
        let mut out = BytesMut::new();
        encoder.encode(&[1.5, 0.25, -2.0], &mut out);
        assert_eq!(encoder.stats().clipped_samples, 2);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut encoder = Pcm16Encoder::new();
        let mut out = BytesMut::new();
        encoder.encode(&[1.0, -1.0, 0.5, -0.5], &mut out);

        let mut expected = Vec::new();
        for v in [32767i16, -32767, 16384, -16384] {
            expected.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(&out[..], &expected[..]);

        let stats = encoder.stats();
        assert_eq!(stats.chunks_encoded, 1);
        assert_eq!(stats.samples_encoded, 4);
    }

    #[test]
    fn test_encode_replaces_previous_chunk() {
        let mut encoder = Pcm16Encoder::new();
        let mut out = BytesMut::new();
        encoder.encode(&[0.1; 64], &mut out);
        encoder.encode(&[0.2; 3], &mut out);
        assert_eq!(out.len(), 6);

        encoder.reset_stats();
        assert_eq!(encoder.stats().chunks_encoded, 0);
    }

    proptest! {
        #[test]
        fn quantize_is_stable_and_bounded(s in -4.0f32..4.0) {
            let q = quantize(s);
            prop_assert_eq!(q, quantize(s));
            prop_assert!(q >= -32767);
            let expected = (s.clamp(-1.0, 1.0) * 32767.0).round();
            prop_assert_eq!(q as f32, expected);
        }

        #[test]
        fn encoded_length_is_two_bytes_per_sample(samples in prop::collection::vec(-1.0f32..1.0, 0..512)) {
            let mut out = BytesMut::new();
            Pcm16Encoder::new().encode(&samples, &mut out);
            prop_assert_eq!(out.len(), samples.len() * 2);
            for (i, &s) in samples.iter().enumerate() {
                let v = i16::from_le_bytes([out[i * 2], out[i * 2 + 1]]);
                prop_assert_eq!(v, quantize(s));
            }
        }
    }
}
