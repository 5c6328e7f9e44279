//! # Header-less Wire Protocol
//!
//! A protocol that transmits no binary header. The header fields travel
//! inside the payload's own JSON document (see [`crate::core::envelope`]).
//!
//! ## Encoding
//! - `encode_header` / `encode_metadata` produce empty buffers
//! - `encode_payload` wraps the payload into an envelope carrying `sync`,
//!   `msgId` and `msgSize`
//!
//! ## Decoding
//! - `decode_header` validates the envelope and fills in the header
//! - `decode_payload` attaches the received bytes as they are
//! - `decode_metadata` does nothing
//!
//! Segmentation is not supported: every message is one complete part.

use crate::config::{HEADER_SIZE, SYNC_MAGIC};
use crate::core::envelope::{read_envelope, wrap_payload};
use crate::core::message::Message;
use crate::error::{ProtocolError, Result};
use crate::protocol::wire::PubSubProtocol;
use bytes::Bytes;
use tracing::{debug, instrument, trace, warn};

static SYNC_HEADER: [u8; 4] = SYNC_MAGIC.to_le_bytes();

/// Stateless header-less protocol. Zero-sized; copy or share it freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderlessProtocol;

impl HeaderlessProtocol {
    pub const fn new() -> Self {
        Self
    }

    /// The sync marker as an integer
    pub const fn sync_word() -> u32 {
        SYNC_MAGIC
    }
}

impl PubSubProtocol for HeaderlessProtocol {
    fn header_size(&self) -> usize {
        HEADER_SIZE
    }

    fn header_buffer_size(&self) -> usize {
        0
    }

    fn sync_header_size(&self) -> usize {
        std::mem::size_of::<u32>()
    }

    fn sync_header(&self) -> Bytes {
        Bytes::from_static(&SYNC_HEADER)
    }

    fn is_message_segmentation_supported(&self) -> bool {
        false
    }

    fn encode_header(&self, _message: &Message) -> Result<Bytes> {
        Ok(Bytes::new())
    }

    #[instrument(level = "trace", skip_all, fields(msg_id = message.header.msg_id, len = message.payload.len()))]
    fn encode_payload(&self, message: &Message) -> Result<Bytes> {
        let out = wrap_payload(&message.payload, message.header.msg_id).inspect_err(|e| {
            debug!(error = %e, "payload could not be wrapped");
        })?;
        trace!(out_len = out.len(), "payload wrapped");
        Ok(out)
    }

    fn encode_metadata(&self, _message: &Message) -> Result<Bytes> {
        Ok(Bytes::new())
    }

    #[instrument(level = "trace", skip_all, fields(len = data.len()))]
    fn decode_header(&self, data: &[u8], message: &mut Message) -> Result<()> {
        let envelope = read_envelope(data).inspect_err(|e| match e {
            ProtocolError::IllegalArgument(reason) => warn!(%reason, "envelope rejected"),
            other => debug!(error = %other, "envelope rejected"),
        })?;

        message.header = envelope.header();
        trace!(
            msg_id = message.header.msg_id,
            payload_size = message.header.payload_size,
            "header decoded"
        );
        Ok(())
    }

    fn decode_payload(&self, data: Bytes, message: &mut Message) -> Result<()> {
        message.payload = data;
        Ok(())
    }

    fn decode_metadata(&self, _data: &[u8], _message: &mut Message) -> Result<()> {
        Ok(())
    }
}
