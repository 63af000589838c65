//! Outbound audio message envelope
//!
//! Wire layout (all little-endian):
//!
//! ```text
//! ┌───────────────┬──────────────────┬──────────────────────────────┐
//! │ controller_id │ payload_length   │ payload                      │
//! │ u8            │ i32              │ i16 PCM, interleaved         │
//! └───────────────┴──────────────────┴──────────────────────────────┘
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::constants::{DEFAULT_CONTROLLER_ID, MESSAGE_HEADER_LEN};
use crate::error::NetworkError;

/// Reusable envelope; one per network engine
///
/// The payload buffer keeps its allocation across ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioMessage {
    controller_id: u8,
    payload: BytesMut,
}

impl AudioMessage {
    pub fn new(controller_id: u8) -> Self {
        Self::with_capacity(controller_id, 0)
    }

    /// Envelope with room for `payload_capacity` bytes
    pub fn with_capacity(controller_id: u8, payload_capacity: usize) -> Self {
        Self {
            controller_id,
            payload: BytesMut::with_capacity(payload_capacity),
        }
    }

    pub fn controller_id(&self) -> u8 {
        self.controller_id
    }

    pub fn set_controller_id(&mut self, controller_id: u8) {
        self.controller_id = controller_id;
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Mutable payload for in-place refill
    pub fn payload_mut(&mut self) -> &mut BytesMut {
        &mut self.payload
    }

    /// Payload decoded back to 16-bit samples
    pub fn samples(&self) -> Vec<i16> {
        self.payload
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    /// Size of the encoded message
    pub fn encoded_len(&self) -> usize {
        MESSAGE_HEADER_LEN + self.payload.len()
    }

    /// Append the wire encoding to `out`
    pub fn encode_to(&self, out: &mut BytesMut) -> Result<(), NetworkError> {
        let len = i32::try_from(self.payload.len())
            .map_err(|_| NetworkError::PayloadTooLarge(self.payload.len()))?;
        out.reserve(self.encoded_len());
        out.put_u8(self.controller_id);
        out.put_i32_le(len);
        out.put_slice(&self.payload);
        Ok(())
    }

    /// Parse a wire message
    pub fn decode(mut data: &[u8]) -> Result<Self, NetworkError> {
        if data.len() < MESSAGE_HEADER_LEN {
            return Err(NetworkError::InvalidMessage);
        }
        let controller_id = data.get_u8();
        let len = data.get_i32_le();
        if len < 0 || len as usize != data.len() {
            return Err(NetworkError::InvalidMessage);
        }
        Ok(Self {
            controller_id,
            payload: BytesMut::from(data),
        })
    }
}

impl Default for AudioMessage {
    fn default() -> Self {
        Self::new(DEFAULT_CONTROLLER_ID)
    }
}
