//! # Core Protocol Components
//!
//! Message model and the JSON envelope that replaces a binary header.
//!
//! ## Components
//! - **Message**: header fields, payload bytes and (unused) metadata
//! - **Envelope**: wrapping outgoing payloads and validating received ones
//!
//! ## Wire Format
//! ```text
//! [Sync(4, LE, optional)] {"sync":<magic>,"msgId":<u32>,...,"msgSize":<u32>}
//! ```
//!
//! ## Security
//! - Envelopes whose `sync` differs from the magic are rejected outright
//! - Received buffers are borrowed, never patched in place
//! - Output buffers are reserved fallibly; allocation failure is an error

pub mod envelope;
pub mod message;
