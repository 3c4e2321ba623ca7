//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConversationId, UserId},
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
};

use super::auth::AuthUser;

/// `/ws` のアップグレード（トークンが無効ならアップグレード前に 401）
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> impl IntoResponse {
    tracing::info!("User '{}' authenticated, upgrading to WebSocket", user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// チャンネルが閉じられた（別の接続に置き換えられた）ら Close フレームを送って終了する。
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive pushed events
    let (tx, rx) = mpsc::unbounded_channel();
    let ticket = state
        .connect_user_usecase
        .execute(user_id.clone(), tx)
        .await;
    tracing::info!(
        "User '{}' connected (connection {})",
        user_id,
        ticket.connection_id
    );

    let state_clone = state.clone();
    let user_id_clone = user_id.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error from '{}': {}", user_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch(&state_clone, &user_id_clone, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("User '{}' requested close", user_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push relay events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let outcome = state
        .disconnect_user_usecase
        .execute(user_id.clone(), ticket.connection_id)
        .await;
    tracing::info!("User '{}' disconnected: {:?}", user_id, outcome);
}

/// 1 つのクライアントイベントを処理する
///
/// 解析できない・不正な ID を含むイベントはログに残して破棄し、接続は維持する。
async fn dispatch(state: &AppState, user_id: &UserId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping malformed event from '{}': {}", user_id, e);
            return;
        }
    };

    match event {
        ClientEvent::Typing(request) => {
            let Ok(conversation_id) = ConversationId::try_from(request.conversation_id) else {
                tracing::debug!("Dropping typing with invalid conversation id");
                return;
            };
            let outcome = state
                .update_typing_usecase
                .execute(user_id.clone(), conversation_id, request.is_typing)
                .await;
            tracing::debug!("Typing from '{}': {:?}", user_id, outcome);
        }
        ClientEvent::MessageRead(request) => {
            let Ok(conversation_id) = ConversationId::try_from(request.conversation_id) else {
                tracing::debug!("Dropping message:read with invalid conversation id");
                return;
            };
            match state
                .mark_read_usecase
                .execute(user_id.clone(), conversation_id)
                .await
            {
                Ok(ids) => tracing::debug!("'{}' read {} messages", user_id, ids.len()),
                Err(e) => tracing::debug!("Dropping message:read from '{}': {}", user_id, e),
            }
        }
        ClientEvent::ChatSelect(request) => {
            let conversation_id = match request.conversation_id.map(ConversationId::try_from) {
                None => None,
                Some(Ok(id)) => Some(id),
                Some(Err(_)) => {
                    tracing::debug!("Dropping chat:select with invalid conversation id");
                    return;
                }
            };
            state
                .select_conversation_usecase
                .execute(user_id.clone(), conversation_id)
                .await;
        }
    }
}
