//! Tayori CLI chat client.
//!
//! - `store`: ローカルのチャット状態（重複排除・未読数・既読・typing・presence）
//! - `typing`: typing 通知のデバウンス
//! - `api`: REST クライアント（再取得の正）
//! - `session` / `runner`: WebSocket セッションと再接続

pub mod api;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod store;
pub mod typing;
pub mod ui;

pub use runner::{ClientConfig, run_client};
