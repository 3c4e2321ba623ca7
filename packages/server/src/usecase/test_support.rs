//! Test fixtures shared by the use case tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use tayori_shared::time::{Clock, FixedClock};

use crate::{
    domain::{
        ConnectionId, ConnectionManager, Conversation, ConversationId, ConversationLocks,
        ConversationRepository, MessagePusher, Timestamp, User, UserId, UserRepository, Username,
    },
    infrastructure::{
        dto::websocket::ServerEvent,
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryConversationRepository, InMemoryFriendRequestRepository,
            InMemoryMessageRepository, InMemoryUserRepository,
        },
    },
};

pub const NOW: i64 = 1672563900000;

pub fn user_id(id: &str) -> UserId {
    UserId::try_from(id).unwrap()
}

pub fn conversation_id(id: &str) -> ConversationId {
    ConversationId::try_from(id).unwrap()
}

/// 受信したテキストフレームを ServerEvent として読み出す
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<String>,
}

impl Inbox {
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(raw) = self.rx.try_recv() {
            events.push(serde_json::from_str(&raw).expect("pushed frame should be a ServerEvent"));
        }
        events
    }
}

pub struct Fixture {
    pub users: Arc<InMemoryUserRepository>,
    pub conversations: Arc<InMemoryConversationRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub friend_requests: Arc<InMemoryFriendRequestRepository>,
    pub locks: Arc<ConversationLocks>,
    pub connections: Arc<ConnectionManager>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub clock: Arc<dyn Clock>,
}

impl Fixture {
    /// alice・bob・carol の 3 ユーザーと、alice/bob の会話 c1 を持つフィクスチャ
    pub async fn new() -> Self {
        let fixture = Self {
            users: Arc::new(InMemoryUserRepository::new()),
            conversations: Arc::new(InMemoryConversationRepository::new()),
            messages: Arc::new(InMemoryMessageRepository::new()),
            friend_requests: Arc::new(InMemoryFriendRequestRepository::new()),
            locks: Arc::new(ConversationLocks::new()),
            connections: Arc::new(ConnectionManager::new()),
            pusher: Arc::new(WebSocketMessagePusher::new()),
            clock: Arc::new(FixedClock::new(NOW)),
        };
        for name in ["alice", "bob", "carol"] {
            fixture
                .users
                .insert(
                    User::new(
                        user_id(name),
                        Username::new(name.to_string()).unwrap(),
                        name.to_string(),
                    )
                    .with_email(format!("{}@example.com", name)),
                )
                .await
                .unwrap();
        }
        fixture
            .conversations
            .insert(Conversation::new(
                conversation_id("c1"),
                user_id("alice"),
                user_id("bob"),
                Timestamp::new(NOW - 1000),
            ))
            .await
            .unwrap();
        fixture
    }

    /// ConnectUserUseCase を通さずに接続だけを登録する
    pub async fn attach(&self, name: &str) -> (ConnectionId, Inbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        self.connections
            .open(user_id(name), connection_id.clone(), Timestamp::new(NOW))
            .await;
        self.pusher
            .register_client(user_id(name), connection_id.clone(), tx)
            .await;
        (connection_id, Inbox { rx })
    }

    pub fn channel() -> (mpsc::UnboundedSender<String>, Inbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Inbox { rx })
    }
}
