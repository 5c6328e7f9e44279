//! # Protocol Layer
//!
//! The [`PubSubProtocol`] contract transports program against, and the
//! header-less implementation of it.
//!
//! ## Components
//! - **Wire**: the eleven-operation protocol trait
//! - **Headerless**: JSON envelope protocol without a binary header

pub mod headerless;
pub mod wire;

pub use headerless::HeaderlessProtocol;
pub use wire::PubSubProtocol;
