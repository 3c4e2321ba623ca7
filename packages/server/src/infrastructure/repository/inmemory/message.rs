//! InMemory Message Repository
//!
//! 挿入順（= 作成順）で保持する。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConversationId, Message, MessageId, MessageRepository, RepositoryError, UserId,
};

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: Message) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::Duplicate(message.id.into_string()));
        }
        messages.push(message);
        Ok(())
    }

    async fn find_by_id(&self, message_id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages.iter().find(|m| &m.id == message_id).cloned())
    }

    async fn list_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn mark_read_from(
        &self,
        conversation_id: &ConversationId,
        author: &UserId,
    ) -> Result<Vec<MessageId>, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let marked = messages
            .iter_mut()
            .filter(|m| &m.conversation_id == conversation_id && &m.sender_id == author && !m.read)
            .map(|m| {
                m.read = true;
                m.id.clone()
            })
            .collect();
        Ok(marked)
    }
}
