//! Audio playback subsystem

pub mod buffer;
pub mod engine;
pub mod sink;
pub mod state;

pub use buffer::WorkingBuffer;
pub use engine::{PlaybackControl, PlaybackEngine, TickOutcome};
pub use sink::{ChunkSink, CollectingSink, NullSink};
pub use state::{PlaybackEvent, PlaybackEventKind, PlaybackHandle, PlaybackState};

/// Engine used for non-networked playback
///
/// The sink is boxed so a host can plug in its own output; the registry
/// defaults to [`NullSink`].
pub type LocalEngine = PlaybackEngine<Box<dyn ChunkSink>>;
