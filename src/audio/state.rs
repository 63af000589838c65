//! Playback state and lifecycle events

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Engine playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Identifies one engine for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaybackHandle(Uuid);

impl PlaybackHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEventKind {
    Started,
    Paused,
    Ended,
}

/// Emitted at state machine transition points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    pub handle: PlaybackHandle,
    pub kind: PlaybackEventKind,
}

/// Fan-out of playback events to channel subscribers
///
/// Subscribers whose receiver was dropped are pruned on the next emit.
#[derive(Default)]
pub struct EventEmitter {
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Register an existing sender (e.g. a registry-wide channel)
    pub fn attach(&mut self, sender: Sender<PlaybackEvent>) {
        self.subscribers.push(sender);
    }

    pub fn emit(&mut self, event: PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_stopped() {
        assert_eq!(PlaybackState::default(), PlaybackState::Stopped);
    }

    #[test]
    fn test_handles_are_unique() {
        assert_ne!(PlaybackHandle::new(), PlaybackHandle::new());
    }

    #[test]
    fn test_emitter_prunes_dropped_subscribers() {
        let mut emitter = EventEmitter::new();
        let kept = emitter.subscribe();
        let dropped = emitter.subscribe();
        drop(dropped);

        let event = PlaybackEvent {
            handle: PlaybackHandle::new(),
            kind: PlaybackEventKind::Started,
        };
        emitter.emit(event);

        assert_eq!(emitter.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap(), event);
    }
}
