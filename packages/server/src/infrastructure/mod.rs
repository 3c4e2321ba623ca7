//! Infrastructure layer
//!
//! ドメイン層の trait の具体的な実装と、ワイヤ形式の DTO。

pub mod auth;
pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod seed;
