//! Registry of active local and per-listener engines
//!
//! All bulk operations are idempotent: addressing a listener with no
//! engines, or a handle that already ended, is a no-op.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::audio::engine::{PlaybackControl, PlaybackEngine};
use crate::audio::sink::{ChunkSink, NullSink};
use crate::audio::state::{
    EventEmitter, PlaybackEvent, PlaybackEventKind, PlaybackHandle, PlaybackState,
};
use crate::audio::LocalEngine;
use crate::codec::{decoder, AudioCodec, AudioFormat};
use crate::config::RelayConfig;
use crate::error::DecodeError;
use crate::network::listener::{Listener, ListenerId};
use crate::network::sink::{NetworkEngine, NetworkSink};
use crate::network::spatial::SpatialSettings;

/// Registry behind a mutex, for hosts that touch it from several threads
pub type SharedRegistry = Arc<Mutex<AudioRegistry>>;

/// Create a new shared registry
pub fn create_shared_registry(config: RelayConfig) -> SharedRegistry {
    AudioRegistry::shared(config)
}

/// Summary of one frame pump pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Engines that were playing and advanced
    pub engines_ticked: usize,
    /// Samples emitted across all engines
    pub samples_emitted: usize,
    /// Engines that reached the end of their asset this frame
    pub finished: Vec<PlaybackHandle>,
    /// Engines stopped because their output failed
    pub failed: Vec<PlaybackHandle>,
}

/// Process-wide playback context
pub struct AudioRegistry {
    config: RelayConfig,
    local: HashMap<PlaybackHandle, LocalEngine>,
    listeners: HashMap<ListenerId, Vec<NetworkEngine>>,
    /// Which listener owns each network engine
    owners: HashMap<PlaybackHandle, ListenerId>,
    /// Every engine reports its lifecycle here
    events_tx: Sender<PlaybackEvent>,
    events_rx: Receiver<PlaybackEvent>,
    subscribers: EventEmitter,
}

impl AudioRegistry {
    /// Create an empty registry
    pub fn new(config: RelayConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            config,
            local: HashMap::new(),
            listeners: HashMap::new(),
            owners: HashMap::new(),
            events_tx,
            events_rx,
            subscribers: EventEmitter::new(),
        }
    }

    /// Create an empty registry behind a shared mutex
    pub fn shared(config: RelayConfig) -> SharedRegistry {
        Arc::new(Mutex::new(Self::new(config)))
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Receive lifecycle events from every engine in the registry
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        self.subscribers.subscribe()
    }
}

/// Local playback
impl AudioRegistry {
    /// Decode `path` and start playing it locally
    ///
    /// A missing file is an error; undecodable content returns `Ok(None)`.
    pub fn play_local(
        &mut self,
        path: impl AsRef<Path>,
        codec: AudioCodec,
        looping: bool,
        volume: f32,
    ) -> Result<Option<PlaybackHandle>, DecodeError> {
        let path = path.as_ref();
        let Some(format) = decoder::decode(path, codec)? else {
            return Ok(None);
        };
        info!("Playing {} locally", path.display());
        Ok(Some(self.play_local_format(format, looping, volume)))
    }

    /// Decode an in-memory asset and start playing it locally
    pub fn play_local_bytes(
        &mut self,
        data: impl Into<Vec<u8>>,
        codec: AudioCodec,
        looping: bool,
        volume: f32,
    ) -> Option<PlaybackHandle> {
        let format = decode_logged(data, codec)?;
        Some(self.play_local_format(format, looping, volume))
    }

    /// Start playing an already decoded asset locally
    pub fn play_local_format(
        &mut self,
        format: AudioFormat,
        looping: bool,
        volume: f32,
    ) -> PlaybackHandle {
        self.play_local_with_sink(format, Box::new(NullSink), looping, volume)
    }

    /// Start playing an already decoded asset into a host-provided sink
    ///
    /// If the sink fails during `tick_all` the engine is stopped, reported
    /// in [`TickReport::failed`] and released.
    pub fn play_local_with_sink(
        &mut self,
        format: AudioFormat,
        sink: Box<dyn ChunkSink>,
        looping: bool,
        volume: f32,
    ) -> PlaybackHandle {
        let capacity = self.config.playback.working_buffer_samples;
        let mut engine: LocalEngine = PlaybackEngine::new(format, sink, capacity);
        engine.set_looping(looping);
        engine.set_volume(volume);
        engine.attach_events(self.events_tx.clone());
        engine.play();

        let handle = engine.handle();
        self.local.insert(handle, engine);
        self.process_events();
        handle
    }

    /// Stop and release every local engine
    pub fn stop_all(&mut self) {
        for (_, mut engine) in self.local.drain() {
            engine.stop();
            engine.dispose();
        }
        self.process_events();
    }

    pub fn pause_all(&mut self) {
        for engine in self.local.values_mut() {
            engine.pause();
        }
        self.process_events();
    }

    pub fn resume_all(&mut self) {
        for engine in self.local.values_mut() {
            engine.play();
        }
        self.process_events();
    }
}

/// Per-listener playback
impl AudioRegistry {
    /// Decode `path` and stream it to `listener`
    ///
    /// A missing file is an error; undecodable content returns `Ok(None)`.
    pub fn play_for_listener(
        &mut self,
        listener: &Arc<dyn Listener>,
        path: impl AsRef<Path>,
        codec: AudioCodec,
        looping: bool,
        volume: f32,
        is_3d: bool,
    ) -> Result<Option<PlaybackHandle>, DecodeError> {
        let path = path.as_ref();
        let Some(format) = decoder::decode(path, codec)? else {
            return Ok(None);
        };
        info!("Streaming {} to {}", path.display(), listener.id());
        Ok(Some(self.play_format_for_listener(
            listener, format, looping, volume, is_3d,
        )))
    }

    /// Decode an in-memory asset and stream it to `listener`
    pub fn play_for_listener_bytes(
        &mut self,
        listener: &Arc<dyn Listener>,
        data: impl Into<Vec<u8>>,
        codec: AudioCodec,
        looping: bool,
        volume: f32,
        is_3d: bool,
    ) -> Option<PlaybackHandle> {
        let format = decode_logged(data, codec)?;
        Some(self.play_format_for_listener(listener, format, looping, volume, is_3d))
    }

    /// Stream an already decoded asset to `listener`
    ///
    /// Each call gets its own engine and cursor, even for a shared asset.
    pub fn play_format_for_listener(
        &mut self,
        listener: &Arc<dyn Listener>,
        format: AudioFormat,
        looping: bool,
        volume: f32,
        is_3d: bool,
    ) -> PlaybackHandle {
        let capacity = self.config.playback.working_buffer_samples;
        let spatial = SpatialSettings::from_config(&self.config.spatial, is_3d);
        let sink = NetworkSink::new(listener, spatial, self.config.network.controller_id, capacity);

        let mut engine = PlaybackEngine::new(format, sink, capacity);
        engine.set_looping(looping);
        engine.set_volume(volume);
        engine.attach_events(self.events_tx.clone());
        engine.play();

        let handle = engine.handle();
        let id = listener.id();
        self.owners.insert(handle, id);
        self.listeners.entry(id).or_default().push(engine);
        self.process_events();
        handle
    }

    /// Stop and release every engine streaming to `listener`
    pub fn stop_for_listener(&mut self, listener: ListenerId) {
        let Some(engines) = self.listeners.remove(&listener) else {
            return;
        };
        debug!("Stopping {} stream(s) for {}", engines.len(), listener);
        for mut engine in engines {
            self.owners.remove(&engine.handle());
            engine.stop();
            engine.dispose();
        }
        self.process_events();
    }

    pub fn pause_for_listener(&mut self, listener: ListenerId) {
        if let Some(engines) = self.listeners.get_mut(&listener) {
            for engine in engines.iter_mut() {
                engine.pause();
            }
        }
        self.process_events();
    }

    pub fn resume_for_listener(&mut self, listener: ListenerId) {
        if let Some(engines) = self.listeners.get_mut(&listener) {
            for engine in engines.iter_mut() {
                engine.play();
            }
        }
        self.process_events();
    }

    pub fn set_volume_for_listener(&mut self, listener: ListenerId, volume: f32) {
        if let Some(engines) = self.listeners.get_mut(&listener) {
            for engine in engines.iter_mut() {
                engine.set_volume(volume);
            }
        }
    }

    /// Cleanup hook for a listener that left or was removed by the host
    pub fn listener_disconnected(&mut self, listener: ListenerId) {
        if self.listeners.contains_key(&listener) {
            info!("{} disconnected, releasing its streams", listener);
        }
        self.stop_for_listener(listener);
    }
}

/// Single-handle control and queries
///
/// Handles that were never issued or have already been released are
/// ignored.
impl AudioRegistry {
    fn engine_mut(&mut self, handle: PlaybackHandle) -> Option<&mut dyn PlaybackControl> {
        if self.local.contains_key(&handle) {
            return self
                .local
                .get_mut(&handle)
                .map(|e| e as &mut dyn PlaybackControl);
        }
        self.network_engine_mut(handle)
            .map(|e| e as &mut dyn PlaybackControl)
    }

    fn engine(&self, handle: PlaybackHandle) -> Option<&dyn PlaybackControl> {
        if let Some(engine) = self.local.get(&handle) {
            return Some(engine as &dyn PlaybackControl);
        }
        let owner = self.owners.get(&handle)?;
        self.listeners
            .get(owner)?
            .iter()
            .find(|e| e.handle() == handle)
            .map(|e| e as &dyn PlaybackControl)
    }

    /// Direct access to a network engine, e.g. to move its emitter
    pub fn network_engine_mut(&mut self, handle: PlaybackHandle) -> Option<&mut NetworkEngine> {
        let owner = self.owners.get(&handle)?;
        self.listeners
            .get_mut(owner)?
            .iter_mut()
            .find(|e| e.handle() == handle)
    }

    /// Stop one engine; it is released like a natural end
    pub fn stop(&mut self, handle: PlaybackHandle) {
        if let Some(engine) = self.engine_mut(handle) {
            engine.stop();
        }
        self.process_events();
    }

    pub fn pause(&mut self, handle: PlaybackHandle) {
        if let Some(engine) = self.engine_mut(handle) {
            engine.pause();
        }
        self.process_events();
    }

    pub fn resume(&mut self, handle: PlaybackHandle) {
        if let Some(engine) = self.engine_mut(handle) {
            engine.play();
        }
        self.process_events();
    }

    pub fn seek(&mut self, handle: PlaybackHandle, seconds: f32) {
        if let Some(engine) = self.engine_mut(handle) {
            engine.seek(seconds);
        }
    }

    pub fn set_volume(&mut self, handle: PlaybackHandle, volume: f32) {
        if let Some(engine) = self.engine_mut(handle) {
            engine.set_volume(volume);
        }
    }

    pub fn set_looping(&mut self, handle: PlaybackHandle, looping: bool) {
        if let Some(engine) = self.engine_mut(handle) {
            engine.set_looping(looping);
        }
    }

    pub fn state(&self, handle: PlaybackHandle) -> Option<PlaybackState> {
        self.engine(handle).map(|e| e.state())
    }

    pub fn position(&self, handle: PlaybackHandle) -> Option<usize> {
        self.engine(handle).map(|e| e.position())
    }

    pub fn contains(&self, handle: PlaybackHandle) -> bool {
        self.local.contains_key(&handle) || self.owners.contains_key(&handle)
    }

    pub fn local_count(&self) -> usize {
        self.local.len()
    }

    pub fn listener_count(&self, listener: ListenerId) -> usize {
        self.listeners.get(&listener).map_or(0, Vec::len)
    }

    /// Total engines across both tables
    pub fn active_count(&self) -> usize {
        self.local.len() + self.owners.len()
    }
}

/// Frame pump and teardown
impl AudioRegistry {
    /// Advance every engine by one frame
    ///
    /// Failures are isolated per engine: a failing engine is stopped and
    /// released while the rest keep playing. A stream whose listener has been
    /// dropped by the host is stopped and released on its own, even when
    /// other streams under the same id are still bound.
    pub fn tick_all(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for engine in self.local.values_mut() {
            tick_one(engine, &mut report);
        }

        for (id, engines) in self.listeners.iter_mut() {
            let mut unbound = 0;
            for engine in engines.iter_mut() {
                if engine.sink().is_bound() {
                    tick_one(engine, &mut report);
                } else {
                    // Ended is drained below and releases the engine
                    engine.stop();
                    unbound += 1;
                }
            }
            if unbound > 0 {
                warn!(
                    "{} stream(s) for {} lost their listener without a disconnect, releasing them",
                    unbound, id
                );
            }
        }

        self.process_events();
        report
    }

    /// Stop everything and clear both tables
    pub fn shutdown(&mut self) {
        info!(
            "Shutting down audio registry ({} local, {} networked)",
            self.local.len(),
            self.owners.len()
        );
        self.stop_all();
        let listeners: Vec<ListenerId> = self.listeners.keys().copied().collect();
        for id in listeners {
            self.stop_for_listener(id);
        }
        self.process_events();
    }

    /// Drain engine events: release ended engines, then forward to subscribers
    fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            if event.kind == PlaybackEventKind::Ended {
                self.release(event.handle);
            }
            self.subscribers.emit(event);
        }
    }

    fn release(&mut self, handle: PlaybackHandle) {
        if let Some(engine) = self.local.remove(&handle) {
            debug!("Released local playback {}", handle);
            engine.dispose();
            return;
        }

        let Some(owner) = self.owners.remove(&handle) else {
            return;
        };
        if let Some(engines) = self.listeners.get_mut(&owner) {
            if let Some(index) = engines.iter().position(|e| e.handle() == handle) {
                engines.swap_remove(index).dispose();
                debug!("Released playback {} for {}", handle, owner);
            }
            if engines.is_empty() {
                self.listeners.remove(&owner);
            }
        }
    }
}

fn tick_one<S: ChunkSink>(engine: &mut PlaybackEngine<S>, report: &mut TickReport) {
    if !engine.is_playing() {
        return;
    }
    match engine.tick() {
        Ok(outcome) => {
            report.engines_ticked += 1;
            report.samples_emitted += outcome.samples();
            if outcome.is_finished() {
                report.finished.push(engine.handle());
            }
        }
        Err(e) => {
            error!("Playback {} failed, stopping it: {}", engine.handle(), e);
            report.failed.push(engine.handle());
        }
    }
}

fn decode_logged(data: impl Into<Vec<u8>>, codec: AudioCodec) -> Option<AudioFormat> {
    match decoder::decode_bytes(data, codec) {
        Ok(format) => Some(format),
        Err(e) => {
            warn!("Failed to decode {} payload: {}", codec, e);
            None
        }
    }
}

impl Drop for AudioRegistry {
    fn drop(&mut self) {
        if !self.local.is_empty() || !self.owners.is_empty() {
            debug!("Audio registry dropped with {} active engine(s)", self.active_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;
    use crate::network::listener::SendChannel;
    use crate::network::message::AudioMessage;
    use glam::Vec3;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<AudioMessage>>,
    }

    impl SendChannel for RecordingChannel {
        fn send(&self, message: &AudioMessage) {
            self.sent.lock().push(message.clone());
        }
    }

    struct TestListener {
        id: ListenerId,
        position: Vec3,
        channel: Arc<RecordingChannel>,
    }

    impl Listener for TestListener {
        fn id(&self) -> ListenerId {
            self.id
        }

        fn is_local_authority(&self) -> bool {
            true
        }

        fn position(&self) -> Vec3 {
            self.position
        }

        fn channel(&self) -> Option<Arc<dyn SendChannel>> {
            Some(self.channel.clone())
        }
    }

    fn listener(id: u64) -> (Arc<dyn Listener>, Arc<RecordingChannel>) {
        let channel = Arc::new(RecordingChannel::default());
        let listener: Arc<dyn Listener> = Arc::new(TestListener {
            id: ListenerId(id),
            position: Vec3::ZERO,
            channel: channel.clone(),
        });
        (listener, channel)
    }

    struct FailingSink;

    impl ChunkSink for FailingSink {
        fn write_chunk(&mut self, _chunk: &[f32]) -> Result<(), PlaybackError> {
            Err(PlaybackError::Sink("device unplugged".into()))
        }
    }

    fn registry(capacity: usize) -> AudioRegistry {
        let mut config = RelayConfig::default();
        config.playback.working_buffer_samples = capacity;
        AudioRegistry::new(config)
    }

    fn ramp(len: usize) -> AudioFormat {
        let samples: Vec<f32> = (0..len).map(|i| i as f32 / len as f32).collect();
        AudioFormat::new(44100, 1, samples).unwrap()
    }

    #[test]
    fn test_operations_on_unknown_listener_are_noops() {
        let mut registry = registry(4);
        let id = ListenerId(42);

        registry.stop_for_listener(id);
        registry.pause_for_listener(id);
        registry.resume_for_listener(id);
        registry.set_volume_for_listener(id, 0.5);
        registry.listener_disconnected(id);

        assert_eq!(registry.listener_count(id), 0);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_listener_streams_have_independent_cursors() {
        let mut registry = registry(4);
        let (alice, alice_rx) = listener(1);
        let (bob, bob_rx) = listener(2);
        let asset = ramp(16);

        let a = registry.play_format_for_listener(&alice, asset.clone(), false, 1.0, false);
        registry.tick_all();
        let b = registry.play_format_for_listener(&bob, asset, false, 1.0, false);
        registry.tick_all();

        assert_eq!(registry.position(a), Some(8));
        assert_eq!(registry.position(b), Some(4));
        assert_eq!(alice_rx.sent.lock().len(), 2);
        assert_eq!(bob_rx.sent.lock().len(), 1);
        assert_eq!(alice_rx.sent.lock()[0].samples(), bob_rx.sent.lock()[0].samples());
    }

    #[test]
    fn test_finished_engine_is_released() {
        let mut registry = registry(8);
        let events = registry.subscribe();
        let (alice, _rx) = listener(1);

        let handle = registry.play_format_for_listener(&alice, ramp(12), false, 1.0, false);
        assert_eq!(registry.listener_count(ListenerId(1)), 1);

        let first = registry.tick_all();
        assert!(first.finished.is_empty());
        let second = registry.tick_all();
        assert_eq!(second.finished, vec![handle]);

        assert!(!registry.contains(handle));
        assert_eq!(registry.listener_count(ListenerId(1)), 0);
        let kinds: Vec<_> = events.try_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![PlaybackEventKind::Started, PlaybackEventKind::Ended]);
    }

    #[test]
    fn test_looping_engine_stays_registered() {
        let mut registry = registry(8);
        let handle = registry.play_local_format(ramp(8), true, 1.0);
        for _ in 0..5 {
            registry.tick_all();
        }
        assert_eq!(registry.state(handle), Some(PlaybackState::Playing));
        assert_eq!(registry.local_count(), 1);
    }

    #[test]
    fn test_pause_and_resume_for_listener() {
        let mut registry = registry(4);
        let (alice, rx) = listener(1);
        let handle = registry.play_format_for_listener(&alice, ramp(32), false, 1.0, false);

        registry.pause_for_listener(ListenerId(1));
        let report = registry.tick_all();
        assert_eq!(report.engines_ticked, 0);
        assert_eq!(registry.state(handle), Some(PlaybackState::Paused));
        assert!(rx.sent.lock().is_empty());

        registry.resume_for_listener(ListenerId(1));
        registry.tick_all();
        assert_eq!(registry.position(handle), Some(4));
    }

    #[test]
    fn test_stop_for_listener_releases_only_that_listener() {
        let mut registry = registry(4);
        let (alice, _a) = listener(1);
        let (bob, _b) = listener(2);
        registry.play_format_for_listener(&alice, ramp(32), false, 1.0, false);
        registry.play_format_for_listener(&alice, ramp(32), true, 1.0, false);
        let kept = registry.play_format_for_listener(&bob, ramp(32), false, 1.0, false);

        registry.stop_for_listener(ListenerId(1));

        assert_eq!(registry.listener_count(ListenerId(1)), 0);
        assert_eq!(registry.listener_count(ListenerId(2)), 1);
        assert_eq!(registry.state(kept), Some(PlaybackState::Playing));
    }

    #[test]
    fn test_single_handle_stop_releases_engine() {
        let mut registry = registry(4);
        let handle = registry.play_local_format(ramp(32), false, 1.0);
        registry.pause(handle);
        assert_eq!(registry.state(handle), Some(PlaybackState::Paused));

        registry.stop(handle);
        assert!(!registry.contains(handle));
        assert_eq!(registry.state(handle), None);

        registry.stop(handle);
        registry.seek(handle, 1.0);
    }

    #[test]
    fn test_volume_for_listener_scales_payload() {
        let mut registry = registry(4);
        let (alice, rx) = listener(1);
        registry.play_format_for_listener(
            &alice,
            AudioFormat::new(44100, 1, vec![1.0, -1.0]).unwrap(),
            false,
            1.0,
            false,
        );
        registry.set_volume_for_listener(ListenerId(1), 0.5);
        registry.tick_all();

        assert_eq!(rx.sent.lock()[0].samples(), vec![16384, -16384]);
    }

    #[test]
    fn test_dropped_listener_is_cleaned_up_on_tick() {
        let mut registry = registry(4);
        let (alice, rx) = listener(1);
        registry.play_format_for_listener(&alice, ramp(32), true, 1.0, false);
        drop(alice);

        let report = registry.tick_all();
        assert_eq!(report.engines_ticked, 0);
        assert_eq!(registry.listener_count(ListenerId(1)), 0);
        assert!(rx.sent.lock().is_empty());
    }

    #[test]
    fn test_stale_stream_is_pruned_beside_live_one() {
        let mut registry = registry(4);
        let (stale, _old_rx) = listener(1);
        let (fresh, rx) = listener(1);
        let old = registry.play_format_for_listener(&stale, ramp(32), true, 1.0, false);
        let new = registry.play_format_for_listener(&fresh, ramp(32), true, 1.0, false);
        drop(stale);

        let report = registry.tick_all();
        assert_eq!(report.engines_ticked, 1);
        assert!(!registry.contains(old));
        assert_eq!(registry.state(new), Some(PlaybackState::Playing));
        assert_eq!(registry.listener_count(ListenerId(1)), 1);
        assert_eq!(rx.sent.lock().len(), 1);

        registry.tick_all();
        assert_eq!(registry.position(new), Some(8));
    }

    #[test]
    fn test_failing_engine_is_isolated() {
        let mut registry = registry(4);
        let events = registry.subscribe();
        let (alice, rx) = listener(1);
        let broken = registry.play_local_with_sink(ramp(32), Box::new(FailingSink), true, 1.0);
        let local = registry.play_local_format(ramp(32), false, 1.0);
        let remote = registry.play_format_for_listener(&alice, ramp(32), false, 1.0, false);

        let report = registry.tick_all();
        assert_eq!(report.failed, vec![broken]);
        assert_eq!(report.engines_ticked, 2);
        assert!(!registry.contains(broken));
        assert_eq!(registry.local_count(), 1);
        assert_eq!(registry.position(local), Some(4));
        assert_eq!(registry.position(remote), Some(4));

        let report = registry.tick_all();
        assert!(report.failed.is_empty());
        assert_eq!(registry.position(local), Some(8));
        assert_eq!(rx.sent.lock().len(), 2);

        // Stopped by the failure, then released without a second Ended
        let ended: Vec<_> = events
            .try_iter()
            .filter(|e| e.kind == PlaybackEventKind::Ended)
            .map(|e| e.handle)
            .collect();
        assert_eq!(ended, vec![broken]);
    }

    #[test]
    fn test_local_bulk_operations() {
        let mut registry = registry(4);
        let a = registry.play_local_format(ramp(32), false, 1.0);
        let b = registry.play_local_format(ramp(32), false, 1.0);

        registry.pause_all();
        assert_eq!(registry.state(a), Some(PlaybackState::Paused));
        registry.resume_all();
        assert_eq!(registry.state(b), Some(PlaybackState::Playing));

        registry.stop_all();
        assert_eq!(registry.local_count(), 0);
    }

    #[test]
    fn test_play_bytes_rejects_garbage() {
        let mut registry = registry(4);
        let (alice, _rx) = listener(1);
        assert!(registry.play_local_bytes(vec![3u8; 128], AudioCodec::Mp3, false, 1.0).is_none());
        assert!(registry
            .play_for_listener_bytes(&alice, vec![3u8; 128], AudioCodec::Wav, false, 1.0, true)
            .is_none());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut registry = registry(4);
        let result = registry.play_local("/no/such/file.ogg", AudioCodec::Ogg, false, 1.0);
        assert!(matches!(result, Err(DecodeError::AssetNotFound(_))));
    }

    #[test]
    fn test_shutdown_clears_everything() {
        let registry = create_shared_registry(RelayConfig::default());
        let (alice, _rx) = listener(1);
        {
            let mut guard = registry.lock();
            guard.play_local_format(ramp(64), true, 1.0);
            guard.play_format_for_listener(&alice, ramp(64), true, 1.0, true);
            guard.shutdown();
        }
        assert_eq!(registry.lock().active_count(), 0);
    }
}
