//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: socket event envelope and payloads (the wire contract)
//! - `http`: REST request / response bodies

pub mod conversion;
pub mod http;
pub mod websocket;
