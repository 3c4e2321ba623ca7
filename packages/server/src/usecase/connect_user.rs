//! UseCase: ユーザー接続処理
//!
//! 認証済みのソケットを接続表に登録し、オンライン状態を永続化して
//! 他の接続中ユーザーに `user:online` を配信する。
//! 同じユーザーの既存接続は新しい接続で置き換える（古い sender は破棄される）。

use std::sync::Arc;

use tayori_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionManager, MessagePusher, Notification, OpenOutcome, PusherChannel,
    Timestamp, UserId, UserRepository, UserStatus,
};

/// 接続の登録結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTicket {
    /// この接続を識別する ID（切断時に使う）
    pub connection_id: ConnectionId,
    pub connected_at: Timestamp,
    /// 置き換えた古い接続
    pub superseded: Option<ConnectionId>,
}

pub struct ConnectUserUseCase {
    users: Arc<dyn UserRepository>,
    connections: Arc<ConnectionManager>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectUserUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        connections: Arc<ConnectionManager>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            connections,
            message_pusher,
            clock,
        }
    }

    /// ユーザー接続を実行
    ///
    /// 状態の書き込みに失敗しても接続自体は成立させる（ログのみ）。
    pub async fn execute(&self, user_id: UserId, sender: PusherChannel) -> ConnectionTicket {
        let connection_id = ConnectionId::generate();
        let connected_at = Timestamp::new(self.clock.now_millis());

        // 配信まで同じユーザーの切断処理と交互に実行されないようにする
        let _presence = self.connections.lock_presence(&user_id).await;

        // 1. 接続表に登録（既存接続があれば置き換え）
        let superseded = match self
            .connections
            .open(user_id.clone(), connection_id.clone(), connected_at)
            .await
        {
            OpenOutcome::Fresh => None,
            OpenOutcome::Superseded(previous) => {
                tracing::info!(
                    "User '{}' reconnected, superseding connection {}",
                    user_id,
                    previous
                );
                Some(previous)
            }
        };

        // 2. MessagePusher に sender を登録
        self.message_pusher
            .register_client(user_id.clone(), connection_id.clone(), sender)
            .await;

        // 3. オンライン状態を永続化
        if let Err(e) = self.users.set_status(&user_id, UserStatus::Online).await {
            tracing::warn!("Failed to persist online status for '{}': {}", user_id, e);
        }

        // 4. 他の接続中ユーザーに通知
        let targets: Vec<UserId> = self
            .connections
            .connected_users()
            .await
            .into_iter()
            .filter(|id| id != &user_id)
            .collect();
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &Notification::UserOnline { user_id: user_id.clone() })
            .await
        {
            tracing::warn!("Failed to broadcast user:online for '{}': {}", user_id, e);
        }

        ConnectionTicket {
            connection_id,
            connected_at,
            superseded,
        }
    }
}
