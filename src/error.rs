//! # Error Types
//!
//! Error handling for the header-less wire protocol.
//!
//! Every codec, registry and activator operation returns [`Result`]; nothing
//! panics across the codec boundary and the codec never retries on its own.
//!
//! ## Error Categories
//! - **Resource Errors**: allocation failures while building output buffers
//! - **Envelope Errors**: malformed documents, missing fields, sync mismatches
//! - **Registry Errors**: unknown services, poisoned locks
//! - **Configuration Errors**: invalid TOML, failed validation, logging setup
//!
//! ## Example Usage
//! ```rust
//! use headerless_wire::error::ProtocolError;
//! use headerless_wire::{HeaderlessProtocol, Message, PubSubProtocol};
//! use tracing::warn;
//!
//! let protocol = HeaderlessProtocol::new();
//! let mut message = Message::default();
//! match protocol.decode_header(br#"{"sync":1,"msgId":2,"msgSize":3}"#, &mut message) {
//!     Err(ProtocolError::IllegalArgument(reason)) => warn!(%reason, "dropping message"),
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

use crate::service::registry::ServiceId;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Registry lock errors
    pub const ERR_REGISTRY_WRITE_LOCK: &str = "Failed to acquire write lock on service registry";
    pub const ERR_REGISTRY_READ_LOCK: &str = "Failed to acquire read lock on service registry";

    /// Envelope errors
    pub const ERR_EMPTY_PAYLOAD: &str = "Payload is empty";
    pub const ERR_EMPTY_ENVELOPE: &str = "Envelope is empty";
    pub const ERR_NOT_AN_OBJECT: &str = "Document is not a JSON object";
    pub const ERR_SYNC_MISMATCH: &str = "Sync marker does not match protocol magic";
    pub const ERR_PAYLOAD_TOO_LARGE: &str = "Payload length exceeds u32 range";
    pub const ERR_MSG_ID_CONFLICT: &str = "Payload msgId does not match message header";

    /// Lifecycle errors
    pub const ERR_ALREADY_STARTED: &str = "Protocol activator already started";
}

/// Primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Out of memory")]
    OutOfMemory,

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Missing envelope field: {0}")]
    MissingField(&'static str),

    #[error("Service not found: {0}")]
    ServiceNotFound(ServiceId),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::collections::TryReserveError> for ProtocolError {
    fn from(_: std::collections::TryReserveError) -> Self {
        ProtocolError::OutOfMemory
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
