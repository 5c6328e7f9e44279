use crate::error::{constants, ProtocolError, Result};
use bytes::Bytes;
use std::collections::HashMap;

/// Free-form message metadata. Carried for API completeness; the header-less
/// protocol neither encodes nor decodes it.
pub type Metadata = HashMap<String, String>;

/// Fixed header fields of a pub/sub protocol message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub msg_id: u32,
    pub msg_major_version: u16,
    pub msg_minor_version: u16,
    pub payload_size: u32,
    pub metadata_size: u32,
    pub seq_nr: u32,
    /// Size of the part carried by this wire message
    pub payload_part_size: u32,
    /// Offset of this part inside the full payload
    pub payload_offset: u32,
}

impl MessageHeader {
    /// Header describing a single, complete part of `payload_size` bytes.
    pub fn unsegmented(msg_id: u32, payload_size: u32) -> Self {
        Self {
            msg_id,
            msg_major_version: 0,
            msg_minor_version: 0,
            payload_size,
            metadata_size: 0,
            seq_nr: 0,
            payload_part_size: payload_size,
            payload_offset: 0,
        }
    }

    /// Whether this header describes the whole payload in one part
    pub fn is_complete(&self) -> bool {
        self.payload_offset == 0 && self.payload_part_size == self.payload_size
    }
}

/// Unit of transfer handed between a transport and a protocol.
///
/// The payload is a [`Bytes`] handle, so attaching a received buffer or
/// cloning a message never copies the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub header: MessageHeader,
    pub payload: Bytes,
    pub metadata: Metadata,
}

impl Message {
    /// Build an outgoing message for `msg_id` carrying `payload`.
    ///
    /// # Errors
    /// Returns `ProtocolError::IllegalArgument` if the payload length does not
    /// fit the header's `u32` size fields.
    pub fn new(msg_id: u32, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let size = payload_size_of(&payload)?;
        Ok(Self {
            header: MessageHeader::unsegmented(msg_id, size),
            payload,
            metadata: Metadata::new(),
        })
    }

    /// Payload length in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

/// Payload length as carried in the header
pub(crate) fn payload_size_of(payload: &[u8]) -> Result<u32> {
    u32::try_from(payload.len())
        .map_err(|_| ProtocolError::IllegalArgument(constants::ERR_PAYLOAD_TOO_LARGE.to_string()))
}
