//! Utilities shared by the Tayori server and client.

pub mod logger;
pub mod time;
