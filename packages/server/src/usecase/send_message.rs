//! UseCase: メッセージ送信
//!
//! REST でメッセージを永続化した後、受信者に `message:receive` を、
//! 両方の参加者に `chat:message:update` を配信する。
//! 受信者がオフラインの場合でも永続化は成功扱い（再取得で追いつく）。
//! 挿入と未読数の加算は会話ロックの中で行い、既読処理と交互に実行されない。

use std::sync::Arc;

use tayori_shared::time::Clock;

use crate::domain::{
    ConnectionManager, ConversationId, ConversationLocks, ConversationRepository, Message,
    MessageId, MessagePushError, MessagePusher, MessageRepository, MessageText, Notification,
    Timestamp, UserId,
};

use super::error::SendMessageError;

pub struct SendMessageUseCase {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
    locks: Arc<ConversationLocks>,
    connections: Arc<ConnectionManager>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
        locks: Arc<ConversationLocks>,
        connections: Arc<ConnectionManager>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            conversations,
            messages,
            locks,
            connections,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 永続化されたメッセージ
    /// * `Err(SendMessageError)` - 会話が存在しない・参加者でない・ストアエラー
    pub async fn execute(
        &self,
        sender: UserId,
        conversation_id: ConversationId,
        text: MessageText,
    ) -> Result<Message, SendMessageError> {
        // 1. 会話と参加者の確認
        let conversation = self
            .conversations
            .find_by_id(&conversation_id)
            .await?
            .ok_or(SendMessageError::ConversationNotFound)?;
        let recipient = conversation
            .other_participant(&sender)
            .cloned()
            .ok_or(SendMessageError::NotParticipant)?;

        // 2. 永続化（挿入から未読数の加算まで既読処理を待たせる）
        let message = {
            let _guard = self.locks.acquire(&conversation_id).await;
            let now = Timestamp::new(self.clock.now_millis());
            let message = Message {
                id: MessageId::generate(),
                conversation_id: conversation_id.clone(),
                sender_id: sender.clone(),
                text,
                read: false,
                created_at: now,
            };
            self.messages.insert(message.clone()).await?;
            self.conversations
                .record_message(&conversation_id, &message.id, &recipient, now)
                .await?;
            message
        };

        // 3. 配信
        self.relay(&message, &recipient).await;

        Ok(message)
    }

    async fn relay(&self, message: &Message, recipient: &UserId) {
        let in_active_chat = self
            .connections
            .is_viewing(recipient, &message.conversation_id)
            .await;
        let received = Notification::MessageReceived {
            message: message.clone(),
            in_active_chat,
        };
        match self.message_pusher.push_to(recipient, &received).await {
            Ok(()) => {}
            Err(MessagePushError::ClientNotFound(_)) => {
                tracing::debug!("Recipient '{}' is offline, message stored only", recipient);
            }
            Err(e) => tracing::warn!("Failed to push message to '{}': {}", recipient, e),
        }

        let updated = Notification::ChatUpdated {
            conversation_id: message.conversation_id.clone(),
            last_message: message.text.as_str().to_string(),
            updated_at: message.created_at,
        };
        if let Err(e) = self
            .message_pusher
            .broadcast(vec![message.sender_id.clone(), recipient.clone()], &updated)
            .await
        {
            tracing::warn!("Failed to broadcast chat:message:update: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::{
        domain::{MockMessageRepository, RepositoryError},
        infrastructure::{dto::websocket::ServerEvent, repository::InMemoryMessageRepository},
        usecase::{
            MarkReadError, MarkReadUseCase,
            test_support::{Fixture, NOW, conversation_id, user_id},
        },
    };

    type PendingRead = JoinHandle<Result<Vec<MessageId>, MarkReadError>>;

    /// 挿入の直後に受信者の既読処理を別タスクで開始するストア
    struct ReadAfterInsert {
        inner: Arc<InMemoryMessageRepository>,
        mark_read: Arc<MarkReadUseCase>,
        reader: UserId,
        pending: Mutex<Option<PendingRead>>,
    }

    #[async_trait]
    impl MessageRepository for ReadAfterInsert {
        async fn insert(&self, message: Message) -> Result<(), RepositoryError> {
            let conversation_id = message.conversation_id.clone();
            self.inner.insert(message).await?;
            let mark_read = self.mark_read.clone();
            let reader = self.reader.clone();
            let handle =
                tokio::spawn(async move { mark_read.execute(reader, conversation_id).await });
            *self.pending.lock().unwrap() = Some(handle);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }

        async fn find_by_id(
            &self,
            message_id: &MessageId,
        ) -> Result<Option<Message>, RepositoryError> {
            self.inner.find_by_id(message_id).await
        }

        async fn list_by_conversation(
            &self,
            conversation_id: &ConversationId,
        ) -> Result<Vec<Message>, RepositoryError> {
            self.inner.list_by_conversation(conversation_id).await
        }

        async fn mark_read_from(
            &self,
            conversation_id: &ConversationId,
            author: &UserId,
        ) -> Result<Vec<MessageId>, RepositoryError> {
            self.inner.mark_read_from(conversation_id, author).await
        }
    }

    fn usecase(fixture: &Fixture) -> SendMessageUseCase {
        SendMessageUseCase::new(
            fixture.conversations.clone(),
            fixture.messages.clone(),
            fixture.locks.clone(),
            fixture.connections.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        )
    }

    fn text(value: &str) -> MessageText {
        MessageText::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_send_message_persists_and_delivers() {
        // テスト項目: 送信したメッセージが永続化され、受信者に message:receive が届く
        // given (前提条件):
        let fixture = Fixture::new().await;
        let (_a, mut alice_inbox) = fixture.attach("alice").await;
        let (_b, mut bob_inbox) = fixture.attach("bob").await;
        let usecase = usecase(&fixture);

        // when (操作):
        let message = usecase
            .execute(user_id("alice"), conversation_id("c1"), text("hello"))
            .await
            .unwrap();

        // then (期待する結果):
        let stored = fixture.messages.find_by_id(&message.id).await.unwrap().unwrap();
        assert_eq!(stored.text.as_str(), "hello");
        assert_eq!(stored.created_at, Timestamp::new(NOW));
        let conversation = fixture
            .conversations
            .find_by_id(&conversation_id("c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.last_message, Some(message.id.clone()));
        assert_eq!(conversation.unread_for(&user_id("bob")), 1);

        let bob_events = bob_inbox.drain();
        assert_eq!(bob_events.len(), 2);
        match &bob_events[0] {
            ServerEvent::MessageReceive(payload) => {
                assert_eq!(payload.id, message.id.to_string());
                assert_eq!(payload.sender, "alice");
                assert!(!payload.is_in_active_chat);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(&bob_events[1], ServerEvent::ChatMessageUpdate(p) if p.last_message == "hello"));

        // 送信者には message:receive は届かず、chat:message:update だけが届く
        let alice_events = alice_inbox.drain();
        assert_eq!(alice_events.len(), 1);
        assert!(matches!(&alice_events[0], ServerEvent::ChatMessageUpdate(p) if p.id == "c1"));
    }

    #[tokio::test]
    async fn test_send_message_flags_active_chat() {
        // テスト項目: 受信者が会話を開いていれば isInActiveChat が true になる
        // given (前提条件):
        let fixture = Fixture::new().await;
        let (_b, mut bob_inbox) = fixture.attach("bob").await;
        fixture
            .connections
            .set_active_conversation(&user_id("bob"), Some(conversation_id("c1")))
            .await;
        let usecase = usecase(&fixture);

        // when (操作):
        usecase
            .execute(user_id("alice"), conversation_id("c1"), text("are you there?"))
            .await
            .unwrap();

        // then (期待する結果):
        let events = bob_inbox.drain();
        assert!(matches!(&events[0], ServerEvent::MessageReceive(p) if p.is_in_active_chat));
    }

    #[tokio::test]
    async fn test_send_message_to_offline_recipient_is_stored() {
        // テスト項目: 受信者がオフラインでも送信は成功し、未読数が増える
        // given (前提条件):
        let fixture = Fixture::new().await;
        let usecase = usecase(&fixture);

        // when (操作):
        let result = usecase
            .execute(user_id("alice"), conversation_id("c1"), text("later"))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        let history = fixture
            .messages
            .list_by_conversation(&conversation_id("c1"))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_rejects_unknown_and_foreign_conversation() {
        // テスト項目: 存在しない会話・参加していない会話への送信はエラーになる
        // given (前提条件):
        let fixture = Fixture::new().await;
        let usecase = usecase(&fixture);

        // when (操作):
        let unknown = usecase
            .execute(user_id("alice"), conversation_id("nope"), text("hi"))
            .await;
        let foreign = usecase
            .execute(user_id("carol"), conversation_id("c1"), text("hi"))
            .await;

        // then (期待する結果):
        assert_eq!(unknown, Err(SendMessageError::ConversationNotFound));
        assert_eq!(foreign, Err(SendMessageError::NotParticipant));
    }

    #[tokio::test]
    async fn test_send_message_store_failure_is_not_relayed() {
        // テスト項目: 永続化に失敗した場合は何も配信されない
        // given (前提条件):
        let fixture = Fixture::new().await;
        let (_b, mut bob_inbox) = fixture.attach("bob").await;
        let mut messages = MockMessageRepository::new();
        messages
            .expect_insert()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable("down".to_string())));
        let usecase = SendMessageUseCase::new(
            fixture.conversations.clone(),
            Arc::new(messages),
            fixture.locks.clone(),
            fixture.connections.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        );

        // when (操作):
        let result = usecase
            .execute(user_id("alice"), conversation_id("c1"), text("hi"))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::Repository(RepositoryError::Unavailable(
                "down".to_string()
            )))
        );
        assert!(bob_inbox.drain().is_empty());
    }

    #[tokio::test]
    async fn test_read_during_send_leaves_no_unread() {
        // テスト項目: 挿入直後に受信者が既読にしても、既読になったメッセージが未読数に残らない
        // given (前提条件):
        let fixture = Fixture::new().await;
        let mark_read = Arc::new(MarkReadUseCase::new(
            fixture.conversations.clone(),
            fixture.messages.clone(),
            fixture.locks.clone(),
            fixture.pusher.clone(),
        ));
        let messages = Arc::new(ReadAfterInsert {
            inner: fixture.messages.clone(),
            mark_read,
            reader: user_id("bob"),
            pending: Mutex::new(None),
        });
        let usecase = SendMessageUseCase::new(
            fixture.conversations.clone(),
            messages.clone(),
            fixture.locks.clone(),
            fixture.connections.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        );

        // when (操作):
        let message = usecase
            .execute(user_id("alice"), conversation_id("c1"), text("quick"))
            .await
            .unwrap();
        let pending = messages
            .pending
            .lock()
            .unwrap()
            .take()
            .expect("insert should start a read");
        let read_ids = pending.await.unwrap().unwrap();

        // then (期待する結果):
        assert_eq!(read_ids, vec![message.id.clone()]);
        let stored = fixture.messages.find_by_id(&message.id).await.unwrap().unwrap();
        assert!(stored.read);
        let conversation = fixture
            .conversations
            .find_by_id(&conversation_id("c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.unread_for(&user_id("bob")), 0);
    }
}
