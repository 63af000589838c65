//! Audio Relay Application
//!
//! Decodes an audio file and streams it to a single UDP peer, driving the
//! registry from a fixed-rate frame pump.
//!
//! Usage: `relay <file> <peer-addr> [ogg|mp3|wav]`

use anyhow::{bail, Context, Result};
use glam::Vec3;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spatial_audio_relay::{
    codec::AudioCodec,
    config::RelayConfig,
    network::{Listener, ListenerId, SendChannel, UdpSendChannel},
    registry::create_shared_registry,
};

/// The single remote peer this process streams to
struct UdpListener {
    id: ListenerId,
    channel: Arc<UdpSendChannel>,
}

impl Listener for UdpListener {
    fn id(&self) -> ListenerId {
        self.id
    }

    fn is_local_authority(&self) -> bool {
        true
    }

    fn position(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn channel(&self) -> Option<Arc<dyn SendChannel>> {
        Some(self.channel.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting spatial audio relay");

    let mut args = std::env::args().skip(1);
    let (Some(file), Some(peer)) = (args.next(), args.next()) else {
        bail!("usage: relay <file> <peer-addr> [ogg|mp3|wav]");
    };
    let file = PathBuf::from(file);
    let peer: SocketAddr = peer
        .parse()
        .with_context(|| format!("invalid peer address: {}", peer))?;
    let codec = match args.next() {
        Some(tag) => tag.parse::<AudioCodec>()?,
        None => AudioCodec::from_path(&file)
            .with_context(|| format!("cannot infer codec from {}", file.display()))?,
    };

    let config = match std::env::var("RELAY_CONFIG") {
        Ok(path) => RelayConfig::load(&path)?,
        Err(_) => RelayConfig::default(),
    };

    let bind: SocketAddr = config
        .network
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.network.bind_address))?;
    let channel = Arc::new(UdpSendChannel::bind(bind, peer)?);
    tracing::info!("Streaming to {} from {}", peer, channel.local_addr()?);

    let listener: Arc<dyn Listener> = Arc::new(UdpListener {
        id: ListenerId(1),
        channel: channel.clone(),
    });

    let registry = create_shared_registry(config.clone());
    let handle = registry
        .lock()
        .play_for_listener(&listener, &file, codec, false, 1.0, false)?;
    let Some(handle) = handle else {
        bail!("could not decode {} as {}", file.display(), codec);
    };
    tracing::info!("Playback {} started", handle);

    let mut interval = tokio::time::interval(config.frame_interval());
    let mut frames: u64 = 0;

    tracing::info!("Starting frame pump - press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut guard = registry.lock();
                let report = guard.tick_all();
                for failed in &report.failed {
                    tracing::warn!("Playback {} failed and was released", failed);
                }
                if guard.listener_count(listener.id()) == 0 {
                    break;
                }
                frames += 1;

                // Periodic stats logging
                if frames % 600 == 0 {
                    let stats = channel.stats();
                    tracing::info!(
                        "Stats: {} datagrams sent, {:.1} KB sent, {} errors",
                        stats.datagrams_sent,
                        stats.bytes_sent as f64 / 1024.0,
                        stats.send_errors
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    registry.lock().shutdown();

    let stats = channel.stats();
    tracing::info!(
        "Done: {} frames, {} datagrams, {:.1} KB sent",
        frames,
        stats.datagrams_sent,
        stats.bytes_sent as f64 / 1024.0
    );
    Ok(())
}
