use crate::core::message::Message;
use crate::error::Result;
use bytes::Bytes;

/// Contract between a pub/sub transport and a wire protocol.
///
/// Transports query the sizes to allocate framing buffers, write the sync
/// header in front of each message, then call the encoders in header,
/// payload, metadata order. Receivers call the decoders in the same order.
/// Implementations are shared behind `Arc<dyn PubSubProtocol>` and must be
/// callable from any thread.
pub trait PubSubProtocol: Send + Sync {
    /// Declared size of the wire header
    fn header_size(&self) -> usize;

    /// Size of the binary header buffer actually transmitted
    fn header_buffer_size(&self) -> usize;

    /// Width of the sync header in bytes
    fn sync_header_size(&self) -> usize;

    /// Marker written in front of each message
    fn sync_header(&self) -> Bytes;

    fn is_message_segmentation_supported(&self) -> bool;

    fn encode_header(&self, message: &Message) -> Result<Bytes>;

    /// Encode the payload. The returned buffer is owned by the caller.
    fn encode_payload(&self, message: &Message) -> Result<Bytes>;

    fn encode_metadata(&self, message: &Message) -> Result<Bytes>;

    /// Populate `message.header` from a received buffer.
    ///
    /// On error `message` is left exactly as it was.
    fn decode_header(&self, data: &[u8], message: &mut Message) -> Result<()>;

    fn decode_payload(&self, data: Bytes, message: &mut Message) -> Result<()>;

    fn decode_metadata(&self, data: &[u8], message: &mut Message) -> Result<()>;
}
