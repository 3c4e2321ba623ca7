//! UseCase: typing インジケーターの中継
//!
//! 会話ごと・ユーザーごとの typing 状態を保持し、値が変わったときだけ
//! 会話の他の参加者に `user:typing` を配信する。
//! サーバー側のタイムアウトは持たない（クライアントのデバウンスが false を送る）。

use std::sync::Arc;

use crate::domain::{
    ConnectionManager, ConversationId, ConversationRepository, MessagePusher, Notification,
    UserId,
};

/// typing 更新の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingOutcome {
    /// 状態が変わり、`targets` に配信した
    Relayed { targets: Vec<UserId> },
    /// 状態が変わらなかったため配信しなかった
    Unchanged,
    /// 会話が見つからない・参加者でないため破棄した
    Dropped,
}

pub struct UpdateTypingUseCase {
    conversations: Arc<dyn ConversationRepository>,
    connections: Arc<ConnectionManager>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UpdateTypingUseCase {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        connections: Arc<ConnectionManager>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            conversations,
            connections,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        conversation_id: ConversationId,
        is_typing: bool,
    ) -> TypingOutcome {
        // 1. 会話と参加者の確認
        let conversation = match self.conversations.find_by_id(&conversation_id).await {
            Ok(Some(conversation)) if conversation.has_participant(&user_id) => conversation,
            Ok(_) => {
                tracing::debug!(
                    "Dropping typing from '{}' for unknown conversation {}",
                    user_id,
                    conversation_id
                );
                return TypingOutcome::Dropped;
            }
            Err(e) => {
                tracing::warn!("Failed to look up conversation {}: {}", conversation_id, e);
                return TypingOutcome::Dropped;
            }
        };

        // 2. 状態を更新（変化がなければ終了）
        if !self
            .connections
            .set_typing(&conversation_id, &user_id, is_typing)
            .await
        {
            return TypingOutcome::Unchanged;
        }

        // 3. 他の参加者に配信
        let targets = conversation.others(&user_id);
        if let Err(e) = self
            .message_pusher
            .broadcast(
                targets.clone(),
                &Notification::Typing {
                    conversation_id,
                    user_id,
                    is_typing,
                },
            )
            .await
        {
            tracing::warn!("Failed to broadcast typing: {}", e);
        }

        TypingOutcome::Relayed { targets }
    }
}
