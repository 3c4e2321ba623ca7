//! Shared application state and dependency wiring.

use std::sync::Arc;

use tayori_shared::time::Clock;

use crate::{
    domain::{Authenticator, ConnectionManager, ConversationLocks, Timestamp},
    infrastructure::{
        auth::StaticTokenAuthenticator,
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryConversationRepository, InMemoryFriendRequestRepository,
            InMemoryMessageRepository, InMemoryUserRepository,
        },
        seed::{Seed, SeedError, SeedTargets},
    },
    usecase::{
        ConnectUserUseCase, DisconnectUserUseCase, FriendQueryUseCase, GetChatListUseCase,
        GetMessagesUseCase, GetUserUseCase, MarkNotificationsReadUseCase, MarkReadUseCase,
        RespondFriendRequestUseCase, SelectConversationUseCase, SendFriendRequestUseCase,
        SendMessageUseCase, UpdateTypingUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Authenticator（トークン → UserId）
    pub authenticator: Arc<dyn Authenticator>,

    // Relay（WebSocket）
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    pub update_typing_usecase: Arc<UpdateTypingUseCase>,
    pub select_conversation_usecase: Arc<SelectConversationUseCase>,
    pub mark_read_usecase: Arc<MarkReadUseCase>,

    // REST
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
    pub get_chat_list_usecase: Arc<GetChatListUseCase>,
    pub get_user_usecase: Arc<GetUserUseCase>,
    pub send_friend_request_usecase: Arc<SendFriendRequestUseCase>,
    pub respond_friend_request_usecase: Arc<RespondFriendRequestUseCase>,
    pub friend_query_usecase: Arc<FriendQueryUseCase>,
    pub mark_notifications_read_usecase: Arc<MarkNotificationsReadUseCase>,
}

impl AppState {
    /// インメモリのストアで依存関係を組み立てる
    ///
    /// `seed` があればユーザー・会話・フレンド関係・トークンを投入する。
    pub async fn in_memory(seed: Option<&Seed>, clock: Arc<dyn Clock>) -> Result<Self, SeedError> {
        // Initialize dependencies in order:
        // 1. Repositories / Authenticator
        // 2. Seed data
        // 3. ConnectionManager / MessagePusher
        // 4. UseCases

        // 1. Create Repositories (in-memory database)
        let users = Arc::new(InMemoryUserRepository::new());
        let conversations = Arc::new(InMemoryConversationRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let friend_requests = Arc::new(InMemoryFriendRequestRepository::new());
        let authenticator = Arc::new(StaticTokenAuthenticator::new());

        // 2. Load seed data
        if let Some(seed) = seed {
            seed.apply(
                SeedTargets {
                    users: users.as_ref(),
                    conversations: conversations.as_ref(),
                    friend_requests: friend_requests.as_ref(),
                    authenticator: authenticator.as_ref(),
                },
                Timestamp::new(clock.now_millis()),
            )
            .await?;
            tracing::info!(
                "Seeded {} users, {} conversations, {} friendships",
                seed.users.len(),
                seed.conversations.len(),
                seed.friendships.len()
            );
        }

        // 3. Create ConnectionManager and MessagePusher (WebSocket implementation)
        let connections = Arc::new(ConnectionManager::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let conversation_locks = Arc::new(ConversationLocks::new());

        // 4. Create UseCases
        Ok(Self {
            authenticator,
            connect_user_usecase: Arc::new(ConnectUserUseCase::new(
                users.clone(),
                connections.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_user_usecase: Arc::new(DisconnectUserUseCase::new(
                users.clone(),
                connections.clone(),
                message_pusher.clone(),
            )),
            update_typing_usecase: Arc::new(UpdateTypingUseCase::new(
                conversations.clone(),
                connections.clone(),
                message_pusher.clone(),
            )),
            select_conversation_usecase: Arc::new(SelectConversationUseCase::new(
                conversations.clone(),
                connections.clone(),
            )),
            mark_read_usecase: Arc::new(MarkReadUseCase::new(
                conversations.clone(),
                messages.clone(),
                conversation_locks.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                conversations.clone(),
                messages.clone(),
                conversation_locks.clone(),
                connections.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            get_messages_usecase: Arc::new(GetMessagesUseCase::new(
                conversations.clone(),
                messages.clone(),
            )),
            get_chat_list_usecase: Arc::new(GetChatListUseCase::new(
                users.clone(),
                conversations.clone(),
                messages.clone(),
            )),
            get_user_usecase: Arc::new(GetUserUseCase::new(users.clone())),
            send_friend_request_usecase: Arc::new(SendFriendRequestUseCase::new(
                users.clone(),
                conversations.clone(),
                friend_requests.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            respond_friend_request_usecase: Arc::new(RespondFriendRequestUseCase::new(
                conversations.clone(),
                friend_requests.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            friend_query_usecase: Arc::new(FriendQueryUseCase::new(
                users.clone(),
                friend_requests.clone(),
            )),
            mark_notifications_read_usecase: Arc::new(MarkNotificationsReadUseCase::new(
                friend_requests,
                message_pusher,
                clock,
            )),
        })
    }
}
