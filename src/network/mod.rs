//! Network distribution layer

pub mod listener;
pub mod message;
pub mod sink;
pub mod spatial;
pub mod udp;

pub use listener::{Listener, ListenerId, SendChannel};
pub use message::AudioMessage;
pub use sink::{NetworkEngine, NetworkSink, NetworkSinkStats};
pub use spatial::{attenuation, SpatialSettings};
pub use udp::{create_socket, UdpSendChannel};
