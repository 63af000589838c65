//! Codec layer
//!
//! Decodes compressed assets into a common f32 PCM format and quantizes
//! playback chunks to the 16-bit little-endian wire format.

pub mod decoder;
pub mod encoder;
pub mod format;

pub use decoder::{decode, decode_bytes, decode_file, decode_tagged};
pub use encoder::Pcm16Encoder;
pub use format::{AudioCodec, AudioFormat};
