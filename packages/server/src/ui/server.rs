//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        get_chat_list, get_friend_notifications, get_friend_requests, get_friends, get_me,
        get_messages, get_user, health_check, mark_friend_notifications_read,
        respond_friend_request, send_friend_request, send_message, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Tayori relay server
///
/// WebSocket エンドポイント（`/ws`）と REST API（`/api/...`）を同じポートで提供する。
///
/// # Example
///
/// ```ignore
/// let state = AppState::in_memory(Some(&seed), Arc::new(SystemClock)).await?;
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// ルーティングを組み立てる
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/users/me", get(get_me))
            .route("/api/users/{user_id}", get(get_user))
            .route("/api/conversations", get(get_chat_list))
            .route(
                "/api/conversations/{conversation_id}/messages",
                get(get_messages).post(send_message),
            )
            .route("/api/friends", get(get_friends))
            .route(
                "/api/friends/requests",
                get(get_friend_requests).post(send_friend_request),
            )
            .route(
                "/api/friends/requests/{request_id}/respond",
                post(respond_friend_request),
            )
            .route("/api/friends/notifications", get(get_friend_notifications))
            .route(
                "/api/friends/notifications/read",
                post(mark_friend_notifications_read),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the relay server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Tayori relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?token=<token>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// 既にバインド済みの listener で起動する（シグナルでは止まらない）
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router()).await
    }
}
