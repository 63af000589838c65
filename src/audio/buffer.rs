//! Fixed-capacity working buffer
//!
//! Each engine owns one of these and reuses it on every tick, so the
//! per-tick path never allocates.

/// Reusable per-tick sample buffer
pub struct WorkingBuffer {
    samples: Vec<f32>,
    /// Valid samples from the last fill
    filled: usize,
    /// Number of fills performed
    fills: u64,
    /// Samples copied across all fills
    samples_copied: u64,
}

impl WorkingBuffer {
    /// Create a new buffer with the specified capacity
    ///
    /// A zero capacity is bumped to one sample so playback always advances.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            filled: 0,
            fills: 0,
            samples_copied: 0,
        }
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Copy up to `capacity` samples from `source`, scaling by `volume`
    ///
    /// Returns the filled slice. Cost is bounded by the capacity, never by the
    /// length of `source`.
    pub fn fill(&mut self, source: &[f32], volume: f32) -> &[f32] {
        let count = source.len().min(self.samples.len());
        let dest = &mut self.samples[..count];
        dest.copy_from_slice(&source[..count]);

        if volume != 1.0 {
            for s in dest.iter_mut() {
                *s *= volume;
            }
        }

        self.filled = count;
        self.fills += 1;
        self.samples_copied += count as u64;
        &self.samples[..count]
    }

    /// Samples written by the last fill
    pub fn filled(&self) -> &[f32] {
        &self.samples[..self.filled]
    }

    /// Get statistics
    pub fn stats(&self) -> WorkingBufferStats {
        WorkingBufferStats {
            capacity: self.samples.len(),
            fills: self.fills,
            samples_copied: self.samples_copied,
        }
    }
}

/// Working buffer statistics
#[derive(Debug, Clone)]
pub struct WorkingBufferStats {
    pub capacity: usize,
    pub fills: u64,
    pub samples_copied: u64,
}
