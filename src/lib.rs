//! # Spatial Audio Relay
//!
//! Frame-driven audio decoding and per-listener streaming for game servers.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                         AUDIO REGISTRY (registry)                        │
//! │   local players: { handle -> engine }                                    │
//! │   listeners:     { listener -> [network engine, ...] }                   │
//! │                                                                          │
//! │   play_* ──► Decoder Bank (codec::decoder) ──► AudioFormat (f32 PCM)     │
//! │                                                                          │
//! │   tick_all() once per frame                                              │
//! │        │                                                                 │
//! │        ▼                                                                 │
//! │  ┌────────────────┐   chunk   ┌──────────────────────────────────────┐   │
//! │  │ PlaybackEngine │ ────────► │ ChunkSink                            │   │
//! │  │ cursor + state │           │  NullSink / CollectingSink (local)   │   │
//! │  │ working buffer │           │  NetworkSink:                        │   │
//! │  └────────────────┘           │   authority check                    │   │
//! │        │ events               │   3D attenuation (scratch copy)      │   │
//! │        ▼                      │   PCM16 LE encode into envelope      │   │
//! │  Started/Paused/Ended         │   SendChannel::send (fire & forget)  │   │
//! │  (prunes ended engines)       └──────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod codec;
pub mod config;
pub mod error;
pub mod network;
pub mod registry;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Working buffer capacity in interleaved samples
    pub const DEFAULT_WORKING_BUFFER_SAMPLES: usize = 1024;

    /// Default scheduler frame rate for the host pump
    pub const DEFAULT_FRAME_RATE_HZ: u32 = 60;

    /// Default audible range for 3D playback, in world units
    pub const DEFAULT_MAX_DISTANCE: f32 = 50.0;

    /// Default controller id stamped on outbound messages
    pub const DEFAULT_CONTROLLER_ID: u8 = 1;

    /// Full-scale value used when quantizing to 16-bit PCM
    pub const PCM16_SCALE: f32 = 32767.0;

    /// Envelope header: controller id (1) + payload length (4)
    pub const MESSAGE_HEADER_LEN: usize = 5;

    /// Maximum datagram size for the UDP send channel
    pub const MAX_DATAGRAM_SIZE: usize = 65_507;
}
