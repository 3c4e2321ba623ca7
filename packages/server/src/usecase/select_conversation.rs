//! UseCase: 表示中の会話の記録
//!
//! クライアントが `chat:select` で報告した会話を接続に紐づける。
//! `message:receive` の `isInActiveChat` はこの値から決まる。

use std::sync::Arc;

use crate::domain::{ConnectionManager, ConversationId, ConversationRepository, UserId};

pub struct SelectConversationUseCase {
    conversations: Arc<dyn ConversationRepository>,
    connections: Arc<ConnectionManager>,
}

impl SelectConversationUseCase {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        connections: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            conversations,
            connections,
        }
    }

    /// 表示中の会話を更新する（`None` は会話を閉じたことを表す）
    ///
    /// 参加していない会話の選択は無視し、`false` を返す。
    pub async fn execute(&self, user_id: UserId, conversation_id: Option<ConversationId>) -> bool {
        if let Some(conversation_id) = &conversation_id {
            match self.conversations.find_by_id(conversation_id).await {
                Ok(Some(conversation)) if conversation.has_participant(&user_id) => {}
                Ok(_) => {
                    tracing::debug!(
                        "Ignoring chat:select of '{}' for conversation {}",
                        user_id,
                        conversation_id
                    );
                    return false;
                }
                Err(e) => {
                    tracing::warn!("Failed to look up conversation {}: {}", conversation_id, e);
                    return false;
                }
            }
        }

        self.connections
            .set_active_conversation(&user_id, conversation_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Fixture, conversation_id, user_id};

    #[tokio::test]
    async fn test_select_and_close_conversation() {
        // テスト項目: 会話を選択すると表示中になり、None で閉じられる
        // given (前提条件):
        let fixture = Fixture::new().await;
        let (_conn, _inbox) = fixture.attach("bob").await;
        let usecase =
            SelectConversationUseCase::new(fixture.conversations.clone(), fixture.connections.clone());

        // when (操作):
        let selected = usecase.execute(user_id("bob"), Some(conversation_id("c1"))).await;

        // then (期待する結果):
        assert!(selected);
        assert!(fixture.connections.is_viewing(&user_id("bob"), &conversation_id("c1")).await);

        // when (操作):
        usecase.execute(user_id("bob"), None).await;

        // then (期待する結果):
        assert!(!fixture.connections.is_viewing(&user_id("bob"), &conversation_id("c1")).await);
    }

    #[tokio::test]
    async fn test_select_foreign_conversation_is_ignored() {
        // テスト項目: 参加していない会話や未接続ユーザーの選択は無視される
        // given (前提条件):
        let fixture = Fixture::new().await;
        let (_conn, _inbox) = fixture.attach("carol").await;
        let usecase =
            SelectConversationUseCase::new(fixture.conversations.clone(), fixture.connections.clone());

        // when (操作) / then (期待する結果):
        assert!(!usecase.execute(user_id("carol"), Some(conversation_id("c1"))).await);
        assert!(!usecase.execute(user_id("alice"), Some(conversation_id("c1"))).await);
        assert!(!fixture.connections.is_viewing(&user_id("carol"), &conversation_id("c1")).await);
    }
}
