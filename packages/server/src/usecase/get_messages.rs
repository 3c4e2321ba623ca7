//! UseCase: メッセージ履歴の取得（REST の再取得用）

use std::sync::Arc;

use crate::domain::{ConversationId, ConversationRepository, Message, MessageRepository, UserId};

use super::error::QueryError;

pub struct GetMessagesUseCase {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl GetMessagesUseCase {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// 会話のメッセージを作成順で返す
    ///
    /// 参加していない会話は存在しないものとして扱う。
    pub async fn execute(
        &self,
        user_id: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, QueryError> {
        let conversation = self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .filter(|conversation| conversation.has_participant(user_id))
            .ok_or(QueryError::NotFound("conversation"))?;

        Ok(self.messages.list_by_conversation(&conversation.id).await?)
    }
}
