//! UDP send channel
//!
//! A [`SendChannel`] that ships each envelope as one datagram to a fixed
//! peer. Delivery is best effort: failures are counted and logged, never
//! returned to the playback path.

use bytes::BytesMut;
use parking_lot::Mutex;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::MAX_DATAGRAM_SIZE;
use crate::error::NetworkError;
use crate::network::listener::SendChannel;
use crate::network::message::AudioMessage;

/// Send buffer requested from the OS
const SEND_BUFFER_BYTES: usize = 256 * 1024;

/// Create a non-blocking UDP socket bound to `bind_addr`
pub fn create_socket(bind_addr: SocketAddr) -> Result<UdpSocket, NetworkError> {
    let socket = Socket::new(Domain::for_address(bind_addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;

    if let Err(e) = socket.set_send_buffer_size(SEND_BUFFER_BYTES) {
        tracing::warn!("Could not set UDP send buffer size: {}", e);
    }

    socket
        .set_nonblocking(true)
        .map_err(|e| NetworkError::BindFailed(e.to_string()))?;
    socket
        .bind(&bind_addr.into())
        .map_err(|e| NetworkError::BindFailed(format!("{}: {}", bind_addr, e)))?;

    Ok(socket.into())
}

/// Datagram transport to one peer
pub struct UdpSendChannel {
    socket: UdpSocket,
    peer: SocketAddr,
    /// Encoding scratch, reused per send
    scratch: Mutex<BytesMut>,
    datagrams_sent: AtomicU64,
    bytes_sent: AtomicU64,
    send_errors: AtomicU64,
}

impl UdpSendChannel {
    pub fn new(socket: UdpSocket, peer: SocketAddr) -> Self {
        Self {
            socket,
            peer,
            scratch: Mutex::new(BytesMut::with_capacity(4096)),
            datagrams_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            send_errors: AtomicU64::new(0),
        }
    }

    /// Bind a fresh socket and target `peer`
    pub fn bind(bind_addr: SocketAddr, peer: SocketAddr) -> Result<Self, NetworkError> {
        let socket = create_socket(bind_addr)?;
        tracing::info!(
            "UDP send channel {} -> {}",
            socket.local_addr().map(|a| a.to_string()).unwrap_or_default(),
            peer
        );
        Ok(Self::new(socket, peer))
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        self.socket
            .local_addr()
            .map_err(|e| NetworkError::BindFailed(e.to_string()))
    }

    fn try_send(&self, message: &AudioMessage) -> Result<usize, NetworkError> {
        if message.encoded_len() > MAX_DATAGRAM_SIZE {
            return Err(NetworkError::PayloadTooLarge(message.encoded_len()));
        }

        let mut scratch = self.scratch.lock();
        scratch.clear();
        message.encode_to(&mut scratch)?;
        self.socket
            .send_to(&scratch, self.peer)
            .map_err(|e| NetworkError::SendFailed(e.to_string()))
    }

    /// Get statistics
    pub fn stats(&self) -> UdpChannelStats {
        UdpChannelStats {
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
        }
    }
}

impl SendChannel for UdpSendChannel {
    fn send(&self, message: &AudioMessage) {
        match self.try_send(message) {
            Ok(n) => {
                self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
                self.bytes_sent.fetch_add(n as u64, Ordering::Relaxed);
            }
            Err(e) => {
                let errors = self.send_errors.fetch_add(1, Ordering::Relaxed);
                // Avoid flooding the log when the peer goes away
                if errors % 100 == 0 {
                    tracing::warn!("UDP send to {} failed: {}", self.peer, e);
                }
            }
        }
    }
}

/// UDP channel statistics
#[derive(Debug, Clone, PartialEq)]
pub struct UdpChannelStats {
    pub datagrams_sent: u64,
    pub bytes_sent: u64,
    pub send_errors: u64,
}
