//! # Service Registration
//!
//! Publishing the protocol to transports that discover protocols by type.
//!
//! ## Components
//! - **Registry**: thread-safe service table keyed by name and properties
//! - **Activator**: start/stop lifecycle owning one protocol registration

pub mod activator;
pub mod registry;

pub use activator::ProtocolActivator;
pub use registry::{Properties, ServiceId, ServiceRegistry};
