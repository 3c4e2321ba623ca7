//! InMemory Conversation Repository

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Conversation, ConversationId, ConversationRepository, MessageId, RepositoryError, Timestamp,
    UserId,
};

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn insert(&self, conversation: Conversation) -> Result<(), RepositoryError> {
        let mut conversations = self.conversations.lock().await;
        if conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::Duplicate(conversation.id.into_string()));
        }
        conversations.insert(conversation.id.clone(), conversation);
        Ok(())
    }

    async fn find_by_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.get(conversation_id).cloned())
    }

    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.values().find(|c| c.is_between(a, b)).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        let mut result: Vec<Conversation> = conversations
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(result)
    }

    async fn record_message(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        recipient: &UserId,
        at: Timestamp,
    ) -> Result<Conversation, RepositoryError> {
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| RepositoryError::ConversationNotFound(conversation_id.to_string()))?;
        conversation.last_message = Some(message_id.clone());
        conversation.updated_at = at;
        *conversation
            .unread_count
            .entry(recipient.clone())
            .or_insert(0) += 1;
        Ok(conversation.clone())
    }

    async fn reset_unread(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| RepositoryError::ConversationNotFound(conversation_id.to_string()))?;
        conversation.unread_count.insert(user_id.clone(), 0);
        Ok(())
    }
}
