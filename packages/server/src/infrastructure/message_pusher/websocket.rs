//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - ユーザーごとの `UnboundedSender` を管理
//! - `Notification` をワイヤ形式（JSON エンベロープ）に変換して送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われる。
//! この実装は生成された sender を受け取り、送信だけを担当する。
//! 登録は `ConnectionId` とセットで保持し、置き換え済みの古い接続からの
//! 登録解除では新しい接続を消さない。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, Notification, PusherChannel, UserId,
    },
    infrastructure::dto::websocket::ServerEvent,
};

struct Registration {
    connection_id: ConnectionId,
    sender: PusherChannel,
}

#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// Key: user id, Value: 現在の接続の sender
    clients: Mutex<HashMap<UserId, Registration>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(notification: &Notification) -> Result<String, MessagePushError> {
        let event = ServerEvent::from(notification);
        serde_json::to_string(&event).map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) {
        let mut clients = self.clients.lock().await;
        let previous = clients.insert(
            user_id.clone(),
            Registration {
                connection_id,
                sender,
            },
        );
        if let Some(previous) = previous {
            // 古い sender はここで drop され、その接続の送信ループが終了する
            tracing::debug!(
                "User '{}' re-registered, dropping connection {}",
                user_id,
                previous.connection_id
            );
        } else {
            tracing::debug!("User '{}' registered to MessagePusher", user_id);
        }
    }

    async fn unregister_client(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let mut clients = self.clients.lock().await;
        let is_current = clients
            .get(user_id)
            .is_some_and(|r| &r.connection_id == connection_id);
        if is_current {
            clients.remove(user_id);
            tracing::debug!("User '{}' unregistered from MessagePusher", user_id);
        }
        is_current
    }

    async fn push_to(
        &self,
        user_id: &UserId,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(notification)?;
        let clients = self.clients.lock().await;

        let registration = clients
            .get(user_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(user_id.to_string()))?;
        registration
            .sender
            .send(payload)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed event to user '{}'", user_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<UserId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(notification)?;
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(registration) => {
                    if let Err(e) = registration.sender.send(payload.clone()) {
                        tracing::warn!("Failed to push event to user '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::debug!("User '{}' not connected during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to / broadcast が通知を JSON エンベロープとして送ること
    // - 再接続時の登録の置き換えと、古い接続からの登録解除の無視
    //
    // 【なぜこのテストが必要か】
    // - タブのリロードのような素早い再接続で、新しい接続が消えてはならない
    // ========================================

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    fn online(id: &str) -> Notification {
        Notification::UserOnline { user_id: user(id) }
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のユーザーにイベントを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher
            .register_client(user("alice"), ConnectionId::generate(), tx)
            .await;

        // when (操作):
        let result = pusher.push_to(&user("alice"), &online("bob")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            rx.recv().await,
            Some(r#"{"event":"user:online","data":{"userId":"bob"}}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 未接続のユーザーへの送信は ClientNotFound になる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&user("ghost"), &online("bob")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_skips_disconnected_targets() {
        // テスト項目: ブロードキャストは未接続のユーザーをスキップして成功する
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher
            .register_client(user("alice"), ConnectionId::generate(), tx)
            .await;

        // when (操作):
        let result = pusher
            .broadcast(vec![user("alice"), user("ghost")], &online("bob"))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_reregister_drops_previous_channel() {
        // テスト項目: 再登録すると古いチャンネルが閉じられ、新しい方に届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        pusher
            .register_client(user("alice"), ConnectionId::generate(), old_tx)
            .await;

        // when (操作):
        pusher
            .register_client(user("alice"), ConnectionId::generate(), new_tx)
            .await;
        pusher.push_to(&user("alice"), &online("bob")).await.unwrap();

        // then (期待する結果):
        assert_eq!(old_rx.recv().await, None);
        assert!(new_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_stale_unregister_is_ignored() {
        // テスト項目: 置き換え済みの接続 ID での登録解除は無視される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let old_connection = ConnectionId::generate();
        let new_connection = ConnectionId::generate();
        let (old_tx, _old_rx) = mpsc::unbounded_channel();
        let (new_tx, _new_rx) = mpsc::unbounded_channel();
        pusher
            .register_client(user("alice"), old_connection.clone(), old_tx)
            .await;
        pusher
            .register_client(user("alice"), new_connection.clone(), new_tx)
            .await;

        // when (操作):
        let stale = pusher.unregister_client(&user("alice"), &old_connection).await;
        let current = pusher.unregister_client(&user("alice"), &new_connection).await;

        // then (期待する結果):
        assert!(!stale);
        assert!(current);
        assert!(pusher.push_to(&user("alice"), &online("bob")).await.is_err());
    }
}
