//! UseCase: ユーザー切断処理
//!
//! 現在の接続が閉じたときだけ offline を永続化・配信する。
//! 再接続で置き換えられた古い接続の close は何も起こさない。
//! 接続処理とはユーザー単位のロックで直列化し、最後の状態が必ず実際の接続と一致する。
//! typing 状態は切断ではクリアしない。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionManager, MessagePusher, Notification, UserId, UserRepository,
    UserStatus,
};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// ユーザーは offline になり、`notified` に通知した
    WentOffline { notified: Vec<UserId> },
    /// 既に新しい接続に置き換えられていたため何もしなかった
    Stale,
}

pub struct DisconnectUserUseCase {
    users: Arc<dyn UserRepository>,
    connections: Arc<ConnectionManager>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUserUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        connections: Arc<ConnectionManager>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            users,
            connections,
            message_pusher,
        }
    }

    pub async fn execute(&self, user_id: UserId, connection_id: ConnectionId) -> DisconnectOutcome {
        // offline の配信まで保持する。この間に来た再接続は後から online を書く
        let _presence = self.connections.lock_presence(&user_id).await;

        // 1. 現在の接続であるときだけ接続表から外す
        if !self.connections.close(&user_id, &connection_id).await {
            tracing::debug!(
                "Connection {} of '{}' was already superseded, skipping offline",
                connection_id,
                user_id
            );
            return DisconnectOutcome::Stale;
        }

        // 2. MessagePusher から sender を外す
        self.message_pusher
            .unregister_client(&user_id, &connection_id)
            .await;

        // 3. オフライン状態を永続化
        if let Err(e) = self.users.set_status(&user_id, UserStatus::Offline).await {
            tracing::warn!("Failed to persist offline status for '{}': {}", user_id, e);
        }

        // 4. 残りの接続中ユーザーに通知
        let notified = self.connections.connected_users().await;
        if let Err(e) = self
            .message_pusher
            .broadcast(
                notified.clone(),
                &Notification::UserOffline {
                    user_id: user_id.clone(),
                },
            )
            .await
        {
            tracing::warn!("Failed to broadcast user:offline for '{}': {}", user_id, e);
        }

        DisconnectOutcome::WentOffline { notified }
    }
}
