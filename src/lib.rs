//! # headerless-wire
//!
//! Header-less wire protocol for publish/subscribe transports. Instead of a
//! binary header, every message travels as a JSON envelope that carries the
//! sync marker, message id and payload size next to the payload's own fields.
//!
//! ## Quick Start
//! ```rust
//! use headerless_wire::{HeaderlessProtocol, Message, PubSubProtocol};
//!
//! let protocol = HeaderlessProtocol::new();
//! let outgoing = Message::new(7, &br#"{"a":1"#[..])?;
//! let wire = protocol.encode_payload(&outgoing)?;
//!
//! let mut incoming = Message::default();
//! protocol.decode_header(&wire, &mut incoming)?;
//! protocol.decode_payload(wire, &mut incoming)?;
//! assert_eq!(incoming.header.msg_id, 7);
//! assert_eq!(incoming.header.payload_size, 6);
//! # Ok::<(), headerless_wire::error::ProtocolError>(())
//! ```
//!
//! ## Modules
//! - [`core`]: message model and envelope handling
//! - [`protocol`]: the protocol trait and its header-less implementation
//! - [`service`]: registry and start/stop lifecycle
//! - [`config`]: constants and configuration
//! - [`utils`]: logging setup

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod utils;

pub use crate::core::message::{Message, MessageHeader, Metadata};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{HeaderlessProtocol, PubSubProtocol};
pub use crate::service::{ProtocolActivator, ServiceId, ServiceRegistry};
