//! # Utility Modules
//!
//! Supporting utilities shared by the protocol and its host.
//!
//! ## Components
//! - **Logging**: structured logging configuration

pub mod logging;
