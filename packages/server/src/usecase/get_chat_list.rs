//! UseCase: 会話一覧の取得（REST の再取得用）

use std::sync::Arc;

use crate::domain::{
    Conversation, ConversationRepository, Message, MessageRepository, User, UserId,
    UserRepository,
};

use super::error::QueryError;

/// 会話一覧の 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub conversation: Conversation,
    /// 相手の参加者
    pub participant: User,
    pub last_message: Option<Message>,
    /// 要求したユーザーの未読数
    pub unread: u32,
}

pub struct GetChatListUseCase {
    users: Arc<dyn UserRepository>,
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl GetChatListUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            users,
            conversations,
            messages,
        }
    }

    /// 更新日時の新しい順に会話一覧を返す
    pub async fn execute(&self, user_id: &UserId) -> Result<Vec<ChatSummary>, QueryError> {
        let conversations = self.conversations.list_for_user(user_id).await?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let Some(other) = conversation.other_participant(user_id) else {
                continue;
            };
            let Some(participant) = self.users.find_by_id(other).await? else {
                tracing::warn!(
                    "Conversation {} references unknown user '{}'",
                    conversation.id,
                    other
                );
                continue;
            };
            let last_message = match &conversation.last_message {
                Some(message_id) => self.messages.find_by_id(message_id).await?,
                None => None,
            };
            summaries.push(ChatSummary {
                unread: conversation.unread_for(user_id),
                conversation,
                participant,
                last_message,
            });
        }

        Ok(summaries)
    }
}
