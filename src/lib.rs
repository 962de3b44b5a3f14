//! Casus Belli order-resolution engine library.
//!
//! Exposes the board model, order validation, the resolver, and protocol
//! modules for use by integration tests and the binary entry point.

pub mod board;
pub mod engine;
pub mod events;
pub mod protocol;
pub mod resolve;
pub mod validate;
