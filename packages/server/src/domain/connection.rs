//! Connection manager
//!
//! ソケット接続に紐づく揮発性の状態をまとめて所有する。
//!
//! - 現在有効な接続（ユーザーごとに最大 1 つ）
//! - 会話ごとの typing 状態
//! - クライアントが現在開いている会話（アクティブチャット）
//!
//! モジュールレベルのグローバル変数ではなく、このオブジェクトを
//! `Arc` で共有することでテスト可能にしている。

use std::collections::HashMap;

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    lock::KeyedLock,
    typing::TypingState,
    value_object::{ConnectionId, ConversationId, Timestamp, UserId},
};

/// 現在有効な接続のレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub connection_id: ConnectionId,
    pub connected_at: Timestamp,
    pub active_conversation: Option<ConversationId>,
}

/// `ConnectionManager::open` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// 新規接続
    Fresh,
    /// 同じユーザーの既存接続を置き換えた（タブのリロードなど）
    Superseded(ConnectionId),
}

#[derive(Debug, Default)]
struct Table {
    connections: HashMap<UserId, ConnectionRecord>,
    typing: TypingState,
}

#[derive(Debug, Default)]
pub struct ConnectionManager {
    table: Mutex<Table>,
    /// 接続・切断の presence 遷移をユーザーごとに直列化する
    presence: KeyedLock<UserId>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザーの presence 遷移（接続表の更新・状態の永続化・配信）の間保持するロック
    pub async fn lock_presence(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        self.presence.acquire(user_id).await
    }

    /// 接続を登録する。既存の接続があれば置き換える。
    pub async fn open(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        connected_at: Timestamp,
    ) -> OpenOutcome {
        let mut table = self.table.lock().await;
        let previous = table.connections.insert(
            user_id,
            ConnectionRecord {
                connection_id,
                connected_at,
                active_conversation: None,
            },
        );
        match previous {
            Some(record) => OpenOutcome::Superseded(record.connection_id),
            None => OpenOutcome::Fresh,
        }
    }

    /// 接続を閉じる。`connection_id` が現在の接続と一致した場合のみ削除し true を返す。
    ///
    /// 置き換え済みの古い接続の切断は false（何もしない）。
    /// typing 状態はここでは消さない（次の状態変化で上書きされるまで残る）。
    pub async fn close(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let mut table = self.table.lock().await;
        let is_current = table
            .connections
            .get(user_id)
            .is_some_and(|record| &record.connection_id == connection_id);
        if is_current {
            table.connections.remove(user_id);
        }
        is_current
    }

    pub async fn is_current(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let table = self.table.lock().await;
        table
            .connections
            .get(user_id)
            .is_some_and(|record| &record.connection_id == connection_id)
    }

    /// 現在接続中のユーザー（ソート済み）
    pub async fn connected_users(&self) -> Vec<UserId> {
        let table = self.table.lock().await;
        let mut users: Vec<UserId> = table.connections.keys().cloned().collect();
        users.sort();
        users
    }

    pub async fn record(&self, user_id: &UserId) -> Option<ConnectionRecord> {
        let table = self.table.lock().await;
        table.connections.get(user_id).cloned()
    }

    /// typing 状態を更新し、値が実際に変化したかを返す
    pub async fn set_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
        is_typing: bool,
    ) -> bool {
        let mut table = self.table.lock().await;
        table.typing.set(conversation_id, user_id, is_typing)
    }

    pub async fn typing_users(&self, conversation_id: &ConversationId) -> Vec<UserId> {
        let table = self.table.lock().await;
        table.typing.typing_users(conversation_id)
    }

    /// クライアントが開いている会話を記録する（接続中でなければ無視）
    pub async fn set_active_conversation(
        &self,
        user_id: &UserId,
        conversation_id: Option<ConversationId>,
    ) -> bool {
        let mut table = self.table.lock().await;
        match table.connections.get_mut(user_id) {
            Some(record) => {
                record.active_conversation = conversation_id;
                true
            }
            None => false,
        }
    }

    /// `user_id` の現在の接続が `conversation_id` を開いているか
    pub async fn is_viewing(&self, user_id: &UserId, conversation_id: &ConversationId) -> bool {
        let table = self.table.lock().await;
        table
            .connections
            .get(user_id)
            .and_then(|record| record.active_conversation.as_ref())
            .is_some_and(|active| active == conversation_id)
    }
}
