//! Playback engine
//!
//! A per-asset state machine driven by an external frame pump. Each call to
//! [`PlaybackEngine::tick`] copies at most one working buffer of samples out
//! of the decoded asset, applies volume, advances the cursor and hands the
//! chunk to the engine's [`ChunkSink`].
//!
//! ```text
//!            play()               pause()
//!  Stopped ──────────► Playing ──────────► Paused
//!     ▲                │  ▲                  │
//!     │ stop() / end   │  └──── play() ──────┘
//!     └────────────────┘        stop() ──► Stopped
//! ```

use crossbeam_channel::{Receiver, Sender};
use std::path::Path;
use tracing::{debug, warn};

use crate::audio::buffer::WorkingBuffer;
use crate::audio::sink::ChunkSink;
use crate::audio::state::{
    EventEmitter, PlaybackEvent, PlaybackEventKind, PlaybackHandle, PlaybackState,
};
use crate::codec::{decoder, AudioCodec, AudioFormat};
use crate::error::{DecodeError, PlaybackError};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing, or nothing left to read
    Idle,
    /// Emitted `samples` and playback continues
    Advanced { samples: usize },
    /// Emitted `samples`, hit the end and wrapped to the start
    Looped { samples: usize },
    /// Emitted `samples`, hit the end and stopped
    ///
    /// `final_position` is the cursor before the stop reset it to zero.
    Finished { samples: usize, final_position: usize },
}

impl TickOutcome {
    pub fn samples(&self) -> usize {
        match *self {
            TickOutcome::Idle => 0,
            TickOutcome::Advanced { samples }
            | TickOutcome::Looped { samples }
            | TickOutcome::Finished { samples, .. } => samples,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TickOutcome::Finished { .. })
    }
}

/// Stateful player for one decoded asset
pub struct PlaybackEngine<S: ChunkSink> {
    handle: PlaybackHandle,
    format: AudioFormat,
    /// Interleaved read cursor, always within `[0, format.len()]`
    position: usize,
    state: PlaybackState,
    looping: bool,
    volume: f32,
    buffer: WorkingBuffer,
    sink: S,
    events: EventEmitter,
}

impl<S: ChunkSink> PlaybackEngine<S> {
    /// Create a stopped engine over an already decoded asset
    pub fn new(format: AudioFormat, sink: S, working_buffer_samples: usize) -> Self {
        Self {
            handle: PlaybackHandle::new(),
            format,
            position: 0,
            state: PlaybackState::Stopped,
            looping: false,
            volume: 1.0,
            buffer: WorkingBuffer::new(working_buffer_samples),
            sink,
            events: EventEmitter::new(),
        }
    }

    /// Decode a file and wrap it in an engine
    ///
    /// A missing file is an error. Content that fails to decode is logged
    /// and yields `Ok(None)`.
    pub fn load_from_file(
        path: impl AsRef<Path>,
        codec: AudioCodec,
        sink: S,
        working_buffer_samples: usize,
    ) -> Result<Option<Self>, DecodeError> {
        let format = decoder::decode(path, codec)?;
        Ok(format.map(|format| Self::new(format, sink, working_buffer_samples)))
    }

    /// Decode an in-memory asset and wrap it in an engine
    ///
    /// Returns `None` (after logging) when the payload cannot be decoded.
    pub fn load_from_bytes(
        data: impl Into<Vec<u8>>,
        codec: AudioCodec,
        sink: S,
        working_buffer_samples: usize,
    ) -> Option<Self> {
        match decoder::decode_bytes(data, codec) {
            Ok(format) => Some(Self::new(format, sink, working_buffer_samples)),
            Err(e) => {
                warn!("Failed to decode {} payload: {}", codec, e);
                None
            }
        }
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor, clamped to the asset length
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.format.len());
    }

    /// Cursor position in seconds
    pub fn current_time(&self) -> f32 {
        self.format.position_to_time(self.position)
    }

    pub fn set_current_time(&mut self, seconds: f32) {
        self.seek(seconds);
    }

    /// Asset duration in seconds
    pub fn duration(&self) -> f32 {
        self.format.duration()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Per-sample gain multiplier; not clamped
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn working_buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Receive this engine's lifecycle events
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Forward lifecycle events into an existing channel
    pub fn attach_events(&mut self, sender: Sender<PlaybackEvent>) {
        self.events.attach(sender);
    }

    fn emit(&mut self, kind: PlaybackEventKind) {
        let handle = self.handle;
        self.events.emit(PlaybackEvent { handle, kind });
    }

    /// Start or resume playback from the current position
    ///
    /// No-op while already playing.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        self.state = PlaybackState::Playing;
        debug!("Playback {} started at {}", self.handle, self.position);
        self.emit(PlaybackEventKind::Started);
    }

    /// Halt advancement, keeping the position
    ///
    /// Only a playing engine can be paused.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.state = PlaybackState::Paused;
        self.emit(PlaybackEventKind::Paused);
    }

    /// Stop and rewind
    ///
    /// Always emits `Ended`, even if the engine was not playing. Once this
    /// returns no further chunks are produced until `play` is called again.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.position = 0;
        self.emit(PlaybackEventKind::Ended);
    }

    /// Jump to `seconds`, clamped to the asset. State is unchanged.
    pub fn seek(&mut self, seconds: f32) {
        self.position = self.format.time_to_position(seconds);
    }

    /// Advance playback by one scheduler frame
    ///
    /// Work is bounded by the working buffer capacity. A sink failure stops
    /// the engine before the error is returned.
    pub fn tick(&mut self) -> Result<TickOutcome, PlaybackError> {
        if self.state != PlaybackState::Playing {
            return Ok(TickOutcome::Idle);
        }

        let length = self.format.len();
        let mut samples = 0;

        if self.position < length {
            let chunk = self
                .buffer
                .fill(&self.format.samples()[self.position..], self.volume);
            samples = chunk.len();
            self.position += samples;

            if let Err(e) = self.sink.write_chunk(chunk) {
                self.stop();
                return Err(e);
            }
        }

        if self.position >= length {
            if self.looping {
                self.position = 0;
                return Ok(TickOutcome::Looped { samples });
            }

            let final_position = self.position;
            debug!("Playback {} reached end of asset", self.handle);
            self.stop();
            return Ok(TickOutcome::Finished {
                samples,
                final_position,
            });
        }

        Ok(TickOutcome::Advanced { samples })
    }

    /// Release the engine, stopping it first if it is still active
    pub fn dispose(mut self) {
        if self.state != PlaybackState::Stopped {
            self.stop();
        }
        self.events.clear();
    }
}

/// Transport controls shared by every engine regardless of sink
pub trait PlaybackControl {
    fn handle(&self) -> PlaybackHandle;
    fn state(&self) -> PlaybackState;
    fn position(&self) -> usize;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, seconds: f32);
    fn set_volume(&mut self, volume: f32);
    fn set_looping(&mut self, looping: bool);
}

impl<S: ChunkSink> PlaybackControl for PlaybackEngine<S> {
    fn handle(&self) -> PlaybackHandle {
        PlaybackEngine::handle(self)
    }

    fn state(&self) -> PlaybackState {
        PlaybackEngine::state(self)
    }

    fn position(&self) -> usize {
        PlaybackEngine::position(self)
    }

    fn play(&mut self) {
        PlaybackEngine::play(self)
    }

    fn pause(&mut self) {
        PlaybackEngine::pause(self)
    }

    fn stop(&mut self) {
        PlaybackEngine::stop(self)
    }

    fn seek(&mut self, seconds: f32) {
        PlaybackEngine::seek(self, seconds)
    }

    fn set_volume(&mut self, volume: f32) {
        PlaybackEngine::set_volume(self, volume)
    }

    fn set_looping(&mut self, looping: bool) {
        PlaybackEngine::set_looping(self, looping)
    }
}
