//! Host-facing seams: listener identity and send channel
//!
//! The host owns its connected clients. This crate only ever holds a
//! `Weak` reference to a [`Listener`], used to resolve a send channel and,
//! for 3D playback, a world position.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::network::message::AudioMessage;

/// Opaque listener key supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Per-listener transport
pub trait SendChannel: Send + Sync {
    /// Fire-and-forget delivery; failures are not reported back
    fn send(&self, message: &AudioMessage);
}

/// A connected recipient of audio
pub trait Listener: Send + Sync {
    fn id(&self) -> ListenerId;

    /// Whether this process is the authority serving this listener
    ///
    /// Mirrored, non-authoritative instances must never be sent to.
    fn is_local_authority(&self) -> bool;

    /// Current world position
    fn position(&self) -> Vec3;

    /// Transport to the listener, if currently connected
    fn channel(&self) -> Option<Arc<dyn SendChannel>>;
}
