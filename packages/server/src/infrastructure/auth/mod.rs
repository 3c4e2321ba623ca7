//! Authenticator 実装
//!
//! - `static_token`: 起動時に読み込んだ token → user の対応表

pub mod static_token;

pub use static_token::StaticTokenAuthenticator;
