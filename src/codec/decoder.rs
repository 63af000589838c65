//! Decoder bank
//!
//! Converts compressed Ogg/Vorbis, MP3 and WAV assets into [`AudioFormat`].
//! Decoding happens once, eagerly, at load time; nothing here runs on the
//! per-tick path.
//!
//! Sample rate and channel count are reported as found in the source. No
//! resampling or channel mixing is performed.

use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{self, CodecType, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::{i24, u24, Sample};
use tracing::{debug, warn};

use crate::codec::format::{AudioCodec, AudioFormat};
use crate::error::DecodeError;

/// PCM variants accepted inside a WAV container
const PCM_CODECS: &[CodecType] = &[
    codecs::CODEC_TYPE_PCM_S8,
    codecs::CODEC_TYPE_PCM_U8,
    codecs::CODEC_TYPE_PCM_S16LE,
    codecs::CODEC_TYPE_PCM_S24LE,
    codecs::CODEC_TYPE_PCM_S32LE,
    codecs::CODEC_TYPE_PCM_F32LE,
    codecs::CODEC_TYPE_PCM_F64LE,
    codecs::CODEC_TYPE_PCM_ALAW,
    codecs::CODEC_TYPE_PCM_MULAW,
];

fn accepts(codec: AudioCodec, found: CodecType) -> bool {
    match codec {
        AudioCodec::Ogg => found == codecs::CODEC_TYPE_VORBIS,
        AudioCodec::Mp3 => found == codecs::CODEC_TYPE_MP3,
        AudioCodec::Wav => PCM_CODECS.contains(&found),
    }
}

/// Decode an asset from disk
///
/// The file is read in full and handed to [`decode_bytes`], so a file and
/// an in-memory copy of it always decode identically.
pub fn decode_file(path: impl AsRef<Path>, codec: AudioCodec) -> Result<AudioFormat, DecodeError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DecodeError::AssetNotFound(path.to_path_buf()),
        _ => DecodeError::Io(e),
    })?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    decode_bytes(data, codec)
}

/// Decode an in-memory asset
pub fn decode_bytes(data: impl Into<Vec<u8>>, codec: AudioCodec) -> Result<AudioFormat, DecodeError> {
    let data = data.into();
    if data.is_empty() {
        return Err(DecodeError::Malformed("empty input".into()));
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(codec.extension());

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::Malformed(format!("unrecognized {} stream: {}", codec, e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::Malformed("no audio track found".into()))?;

    let found = track.codec_params.codec;
    if !accepts(codec, found) {
        let found = symphonia::default::get_codecs()
            .get_codec(found)
            .map(|d| d.short_name.to_string())
            .unwrap_or_else(|| format!("{:?}", found));
        return Err(DecodeError::CodecMismatch {
            expected: codec.to_string(),
            found,
        });
    }

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::MissingSampleRate)?;
    let mut channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => {
                warn!("Stopping {} decode on read error: {}", codec, e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                // Some streams only report their layout on the first decoded packet
                let packet_channels = decoded.spec().channels.count();
                match channels {
                    None => channels = Some(packet_channels),
                    Some(expected) if expected != packet_channels => {
                        return Err(DecodeError::Malformed(format!(
                            "channel count changed mid-stream ({} -> {})",
                            expected, packet_channels
                        )));
                    }
                    Some(_) => {}
                }
                append_interleaved(&decoded, &mut samples);
            }
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping corrupt {} packet: {}", codec, e);
                continue;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let channels = channels.ok_or_else(|| DecodeError::Malformed("unknown channel layout".into()))?;
    if !(1..=2).contains(&channels) {
        return Err(DecodeError::UnsupportedChannels(channels));
    }
    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    debug!(
        "Decoded {}: {} Hz, {} channel(s), {} samples",
        codec,
        sample_rate,
        channels,
        samples.len()
    );

    AudioFormat::new(sample_rate, channels as u16, samples)
}

/// Decode by codec tag string (`"ogg"`, `"mp3"`, `"wav"`)
pub fn decode_tagged(data: impl Into<Vec<u8>>, tag: &str) -> Result<AudioFormat, DecodeError> {
    let codec: AudioCodec = tag.parse()?;
    decode_bytes(data, codec)
}

/// Decode a path, downgrading content failures to `None`
///
/// Missing files are still returned as errors; malformed or unsupported
/// payloads are logged and reported as "no playable asset".
pub fn decode(path: impl AsRef<Path>, codec: AudioCodec) -> Result<Option<AudioFormat>, DecodeError> {
    let path = path.as_ref();
    match decode_file(path, codec) {
        Ok(format) => Ok(Some(format)),
        Err(e) if e.is_not_found() => Err(e),
        Err(e) => {
            warn!("Failed to decode {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Append a decoded packet to `out` as interleaved f32
///
/// Fixed-point formats are divided by their full-scale magnitude.
fn append_interleaved(decoded: &AudioBufferRef<'_>, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(b) => interleave(&**b, out, |s: f32| s),
        AudioBufferRef::F64(b) => interleave(&**b, out, |s: f64| s as f32),
        AudioBufferRef::S8(b) => interleave(&**b, out, |s: i8| s as f32 / 128.0),
        AudioBufferRef::S16(b) => interleave(&**b, out, |s: i16| s as f32 / 32768.0),
        AudioBufferRef::S24(b) => interleave(&**b, out, |s: i24| s.inner() as f32 / 8_388_608.0),
        AudioBufferRef::S32(b) => {
            interleave(&**b, out, |s: i32| (s as f64 / 2_147_483_648.0) as f32)
        }
        AudioBufferRef::U8(b) => interleave(&**b, out, |s: u8| (s as f32 - 128.0) / 128.0),
        AudioBufferRef::U16(b) => interleave(&**b, out, |s: u16| (s as f32 - 32768.0) / 32768.0),
        AudioBufferRef::U24(b) => {
            interleave(&**b, out, |s: u24| (s.inner() as f32 - 8_388_608.0) / 8_388_608.0)
        }
        AudioBufferRef::U32(b) => {
            interleave(&**b, out, |s: u32| ((s as f64 - 2_147_483_648.0) / 2_147_483_648.0) as f32)
        }
    }
}

fn interleave<S: Sample, F: Fn(S) -> f32>(buf: &AudioBuffer<S>, out: &mut Vec<f32>, convert: F) {
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    if channels == 0 || frames == 0 {
        return;
    }

    out.reserve(frames * channels);
    for frame in 0..frames {
        for ch in 0..channels {
            out.push(convert(buf.chan(ch)[frame]));
        }
    }
}
