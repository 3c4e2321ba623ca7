//! Tayori relay server library.
//!
//! Presence, typing indicators, message delivery, read receipts and
//! friend-request hints over WebSocket, with a REST API as the source of truth.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
