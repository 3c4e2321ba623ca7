//! MessagePusher trait 定義
//!
//! 接続中のクライアントへ通知を届けるトランスポートの抽象化。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供する。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    MessagePushError,
    notification::Notification,
    value_object::{ConnectionId, UserId},
};

/// クライアントごとの送信チャンネル（シリアライズ済みのテキストフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントを登録する。同じユーザーの古いチャンネルは破棄される。
    async fn register_client(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    );

    /// `connection_id` が現在の登録と一致する場合のみ登録解除する
    async fn unregister_client(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool;

    /// 特定のユーザーへ通知する（未接続なら ClientNotFound）
    async fn push_to(
        &self,
        user_id: &UserId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// 複数ユーザーへ通知する（未接続のユーザーはスキップ）
    async fn broadcast(
        &self,
        targets: Vec<UserId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;
}
