//! Network chunk sink
//!
//! Turns each tick's chunk into an outbound envelope for one listener:
//! authority check, optional distance attenuation, PCM16 encoding, send.

use std::sync::{Arc, Weak};
use tracing::warn;

use crate::audio::engine::PlaybackEngine;
use crate::audio::sink::ChunkSink;
use crate::codec::encoder::Pcm16Encoder;
use crate::error::PlaybackError;
use crate::network::listener::{Listener, ListenerId};
use crate::network::message::AudioMessage;
use crate::network::spatial::{apply_gain, SpatialSettings};

/// Engine bound to a single listener
pub type NetworkEngine = PlaybackEngine<NetworkSink>;

/// Sink that streams chunks to one listener
pub struct NetworkSink {
    listener: Weak<dyn Listener>,
    listener_id: ListenerId,
    spatial: SpatialSettings,
    /// Reused for every send
    message: AudioMessage,
    encoder: Pcm16Encoder,
    /// Attenuated copy of the chunk; the engine's buffer is never modified
    scratch: Vec<f32>,
    stats: NetworkSinkStats,
}

impl NetworkSink {
    /// Create a sink for `listener`
    ///
    /// `chunk_samples` sizes the envelope and scratch buffers up front.
    pub fn new(
        listener: &Arc<dyn Listener>,
        spatial: SpatialSettings,
        controller_id: u8,
        chunk_samples: usize,
    ) -> Self {
        Self {
            listener: Arc::downgrade(listener),
            listener_id: listener.id(),
            spatial,
            message: AudioMessage::with_capacity(controller_id, chunk_samples * 2),
            encoder: Pcm16Encoder::new(),
            scratch: Vec::with_capacity(chunk_samples),
            stats: NetworkSinkStats::default(),
        }
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// Whether the listener is still alive on the host
    pub fn is_bound(&self) -> bool {
        self.listener.strong_count() > 0
    }

    pub fn spatial(&self) -> &SpatialSettings {
        &self.spatial
    }

    /// Enable distance attenuation with the given range
    ///
    /// A range that is not a positive finite number culls every chunk.
    pub fn set_3d(&mut self, max_distance: f32) {
        if !max_distance.is_finite() || max_distance <= 0.0 {
            warn!(
                "Invalid 3D range {} for {}, its stream will be silent",
                max_distance, self.listener_id
            );
        }
        self.spatial.enabled = true;
        self.spatial.max_distance = max_distance;
    }

    pub fn set_2d(&mut self) {
        self.spatial.enabled = false;
    }

    pub fn set_emitter_position(&mut self, position: glam::Vec3) {
        self.spatial.emitter_position = position;
    }

    pub fn set_follow_listener(&mut self, follow: bool) {
        self.spatial.follow_listener = follow;
    }

    pub fn controller_id(&self) -> u8 {
        self.message.controller_id()
    }

    pub fn set_controller_id(&mut self, controller_id: u8) {
        self.message.set_controller_id(controller_id);
    }

    /// The envelope as last filled
    pub fn last_message(&self) -> &AudioMessage {
        &self.message
    }

    /// Get statistics
    pub fn stats(&self) -> NetworkSinkStats {
        self.stats.clone()
    }
}

impl ChunkSink for NetworkSink {
    fn write_chunk(&mut self, chunk: &[f32]) -> Result<(), PlaybackError> {
        let Some(listener) = self.listener.upgrade() else {
            self.stats.skipped_unbound += 1;
            return Ok(());
        };

        if !listener.is_local_authority() {
            self.stats.skipped_remote += 1;
            return Ok(());
        }

        let Some(channel) = listener.channel() else {
            self.stats.skipped_unbound += 1;
            return Ok(());
        };

        let samples: &[f32] = if self.spatial.enabled {
            // Sampled once per tick, no interpolation
            let listener_position = listener.position();
            if self.spatial.follow_listener {
                self.spatial.emitter_position = listener_position;
            }

            match self.spatial.gain_at(listener_position) {
                Some(gain) => {
                    apply_gain(chunk, gain, &mut self.scratch);
                    self.scratch.as_slice()
                }
                None => {
                    self.stats.skipped_out_of_range += 1;
                    return Ok(());
                }
            }
        } else {
            chunk
        };

        self.encoder.encode(samples, self.message.payload_mut());
        channel.send(&self.message);

        self.stats.chunks_sent += 1;
        self.stats.bytes_sent += self.message.payload_len() as u64;
        Ok(())
    }
}

/// Network sink statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSinkStats {
    pub chunks_sent: u64,
    pub bytes_sent: u64,
    /// Chunks dropped because the listener is beyond `max_distance`
    pub skipped_out_of_range: u64,
    /// Chunks dropped because this process is not the listener's authority
    pub skipped_remote: u64,
    /// Chunks dropped because the listener or its channel is gone
    pub skipped_unbound: u64,
}
