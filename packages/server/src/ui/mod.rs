//! UI layer: Axum のルーティング・ハンドラー・サーバー起動

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
