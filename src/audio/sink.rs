//! Chunk sinks
//!
//! The per-tick output step of a [`PlaybackEngine`](crate::audio::PlaybackEngine).
//! Local players use [`NullSink`]; networked players use
//! [`NetworkSink`](crate::network::NetworkSink).

use crate::error::PlaybackError;

/// Consumer of one tick's worth of samples
pub trait ChunkSink: Send {
    /// Handle the samples produced by one tick
    ///
    /// `chunk` borrows the engine's working buffer and must not be retained.
    fn write_chunk(&mut self, chunk: &[f32]) -> Result<(), PlaybackError>;
}

/// Discards every chunk
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ChunkSink for NullSink {
    fn write_chunk(&mut self, _chunk: &[f32]) -> Result<(), PlaybackError> {
        Ok(())
    }
}

/// Keeps every chunk it receives, in order
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    chunks: Vec<Vec<f32>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[Vec<f32>] {
        &self.chunks
    }

    /// All received samples, concatenated
    pub fn samples(&self) -> Vec<f32> {
        self.chunks.iter().flatten().copied().collect()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}

impl ChunkSink for CollectingSink {
    fn write_chunk(&mut self, chunk: &[f32]) -> Result<(), PlaybackError> {
        self.chunks.push(chunk.to_vec());
        Ok(())
    }
}

impl<S: ChunkSink + ?Sized> ChunkSink for Box<S> {
    fn write_chunk(&mut self, chunk: &[f32]) -> Result<(), PlaybackError> {
        (**self).write_chunk(chunk)
    }
}
