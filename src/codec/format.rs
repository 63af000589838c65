//! Common PCM format and codec tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::DecodeError;

/// Compressed formats the decoder bank understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// Ogg container with Vorbis audio
    Ogg,
    /// MPEG-1/2 layer III
    Mp3,
    /// RIFF WAVE with PCM samples
    Wav,
}

impl AudioCodec {
    pub const ALL: [AudioCodec; 3] = [AudioCodec::Ogg, AudioCodec::Mp3, AudioCodec::Wav];

    /// Canonical file extension, also used as the probe hint
    pub fn extension(&self) -> &'static str {
        match self {
            AudioCodec::Ogg => "ogg",
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Wav => "wav",
        }
    }

    /// Guess the codec from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| DecodeError::UnsupportedCodec(path.display().to_string()))?;
        ext.parse()
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioCodec {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ogg" | "oga" => Ok(AudioCodec::Ogg),
            "mp3" => Ok(AudioCodec::Mp3),
            "wav" | "wave" => Ok(AudioCodec::Wav),
            other => Err(DecodeError::UnsupportedCodec(other.to_string())),
        }
    }
}

/// Decoded, interleaved f32 PCM
///
/// The sample buffer is shared behind an `Arc` so several engines can play
/// the same decoded asset; it is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFormat {
    sample_rate: u32,
    channels: u16,
    samples: Arc<[f32]>,
}

impl AudioFormat {
    /// Build a format, checking the rate and channel invariants
    pub fn new(
        sample_rate: u32,
        channels: u16,
        samples: impl Into<Arc<[f32]>>,
    ) -> Result<Self, DecodeError> {
        if sample_rate == 0 {
            return Err(DecodeError::MissingSampleRate);
        }
        if !(1..=2).contains(&channels) {
            return Err(DecodeError::UnsupportedChannels(channels as usize));
        }
        Ok(Self {
            sample_rate,
            channels,
            samples: samples.into(),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Total interleaved sample count
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Interleaved samples per second of audio
    pub fn samples_per_second(&self) -> f64 {
        self.sample_rate as f64 * self.channels as f64
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        (self.len() as f64 / self.samples_per_second()) as f32
    }

    /// Convert a time offset to a clamped interleaved sample position
    pub fn time_to_position(&self, seconds: f32) -> usize {
        let raw = (seconds as f64 * self.samples_per_second()).round();
        if raw.is_nan() || raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.len())
        }
    }

    /// Convert an interleaved sample position to seconds
    pub fn position_to_time(&self, position: usize) -> f32 {
        (position as f64 / self.samples_per_second()) as f32
    }
}
