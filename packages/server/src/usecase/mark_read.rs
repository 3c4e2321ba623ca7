//! UseCase: 既読処理
//!
//! 読み手の相手が送った未読メッセージを一括で既読にし、
//! 実際に既読になったメッセージがあるときだけ送信者に `message:read:ack` を配信する。
//! 既読化と未読数のリセットは送信と同じ会話ロックの中で行う。

use std::sync::Arc;

use crate::domain::{
    ConversationId, ConversationLocks, ConversationRepository, MessageId, MessagePushError,
    MessagePusher, MessageRepository, Notification, UserId,
};

use super::error::MarkReadError;

pub struct MarkReadUseCase {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
    locks: Arc<ConversationLocks>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl MarkReadUseCase {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
        locks: Arc<ConversationLocks>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            conversations,
            messages,
            locks,
            message_pusher,
        }
    }

    /// 既読処理を実行し、既読にしたメッセージ ID を返す
    pub async fn execute(
        &self,
        reader: UserId,
        conversation_id: ConversationId,
    ) -> Result<Vec<MessageId>, MarkReadError> {
        // 1. 会話と参加者の確認
        let conversation = self
            .conversations
            .find_by_id(&conversation_id)
            .await?
            .ok_or(MarkReadError::ConversationNotFound)?;
        let author = conversation
            .other_participant(&reader)
            .cloned()
            .ok_or(MarkReadError::NotParticipant)?;

        // 2. 相手のメッセージを既読にし、自分の未読数をリセット
        let message_ids = {
            let _guard = self.locks.acquire(&conversation_id).await;
            let message_ids = self
                .messages
                .mark_read_from(&conversation_id, &author)
                .await?;
            self.conversations
                .reset_unread(&conversation_id, &reader)
                .await?;
            message_ids
        };

        if message_ids.is_empty() {
            return Ok(message_ids);
        }

        // 3. 送信者に既読通知
        let ack = Notification::MessagesRead {
            conversation_id,
            message_ids: message_ids.clone(),
            read_by: reader,
        };
        match self.message_pusher.push_to(&author, &ack).await {
            Ok(()) => {}
            Err(MessagePushError::ClientNotFound(_)) => {
                tracing::debug!("Author '{}' is offline, read receipt stored only", author);
            }
            Err(e) => tracing::warn!("Failed to push read receipt to '{}': {}", author, e),
        }

        Ok(message_ids)
    }
}
