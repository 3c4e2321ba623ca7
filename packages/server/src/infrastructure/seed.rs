//! Seed file loader.
//!
//! Fills the in-memory store and the token table from a JSON document:
//!
//! ```json
//! {
//!   "users": [{"id": "alice", "username": "alice", "name": "Alice",
//!              "email": "alice@example.com", "token": "alice-token"}],
//!   "conversations": [{"id": "c1", "participants": ["alice", "bob"]}],
//!   "friendships": [{"id": "f1", "requester": "alice", "recipient": "bob",
//!                    "status": "accepted"}]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    domain::{
        Conversation, ConversationId, ConversationRepository, FriendRequest, FriendRequestId,
        FriendRequestRepository, FriendshipStatus, RepositoryError, Timestamp, User, UserId,
        UserRepository, Username, ValueObjectError,
    },
    infrastructure::auth::StaticTokenAuthenticator,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid seed value: {0}")]
    Invalid(#[from] ValueObjectError),

    #[error("failed to store seed record: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub conversations: Vec<SeedConversation>,
    #[serde(default)]
    pub friendships: Vec<SeedFriendship>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConversation {
    pub id: String,
    pub participants: [String; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedFriendship {
    pub id: String,
    pub requester: String,
    pub recipient: String,
    pub status: FriendshipStatus,
}

/// Borrowed store handles the seed is written into
pub struct SeedTargets<'a> {
    pub users: &'a dyn UserRepository,
    pub conversations: &'a dyn ConversationRepository,
    pub friend_requests: &'a dyn FriendRequestRepository,
    pub authenticator: &'a StaticTokenAuthenticator,
}

impl Seed {
    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Write every record into the targets; stops at the first invalid record.
    pub async fn apply(&self, targets: SeedTargets<'_>, now: Timestamp) -> Result<(), SeedError> {
        for seed_user in &self.users {
            let id = UserId::new(seed_user.id.clone())?;
            let mut user = User::new(
                id.clone(),
                Username::new(seed_user.username.clone())?,
                seed_user.name.clone(),
            );
            if let Some(email) = &seed_user.email {
                user = user.with_email(email.clone());
            }
            targets.users.insert(user).await?;
            targets
                .authenticator
                .insert(seed_user.token.clone(), id)
                .await;
        }

        for seed_conversation in &self.conversations {
            let [a, b] = &seed_conversation.participants;
            targets
                .conversations
                .insert(Conversation::new(
                    ConversationId::new(seed_conversation.id.clone())?,
                    UserId::new(a.clone())?,
                    UserId::new(b.clone())?,
                    now,
                ))
                .await?;
        }

        for seed_friendship in &self.friendships {
            let mut request = FriendRequest::pending(
                FriendRequestId::new(seed_friendship.id.clone())?,
                UserId::new(seed_friendship.requester.clone())?,
                UserId::new(seed_friendship.recipient.clone())?,
                now,
            );
            request.status = seed_friendship.status;
            // 事前投入された関係は確認済みとして扱う
            request.request_read = true;
            request.acceptance_read = true;
            targets.friend_requests.insert(request).await?;
        }

        tracing::info!(
            "Seeded {} users, {} conversations, {} friendships",
            self.users.len(),
            self.conversations.len(),
            self.friendships.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Authenticator,
        infrastructure::repository::{
            InMemoryConversationRepository, InMemoryFriendRequestRepository,
            InMemoryUserRepository,
        },
    };

    const SEED: &str = r#"{
        "users": [
            {"id": "alice", "username": "alice", "name": "Alice", "email": "alice@example.com", "token": "t-alice"},
            {"id": "bob", "username": "bob", "name": "Bob", "token": "t-bob"}
        ],
        "conversations": [{"id": "c1", "participants": ["alice", "bob"]}],
        "friendships": [{"id": "f1", "requester": "alice", "recipient": "bob", "status": "accepted"}]
    }"#;

    #[tokio::test]
    async fn test_apply_seed_populates_store_and_tokens() {
        // テスト項目: シードからユーザー・会話・フレンド関係・token が投入される
        // given (前提条件):
        let users = InMemoryUserRepository::new();
        let conversations = InMemoryConversationRepository::new();
        let friend_requests = InMemoryFriendRequestRepository::new();
        let authenticator = StaticTokenAuthenticator::new();
        let seed = Seed::from_json(SEED).unwrap();

        // when (操作):
        seed.apply(
            SeedTargets {
                users: &users,
                conversations: &conversations,
                friend_requests: &friend_requests,
                authenticator: &authenticator,
            },
            Timestamp::new(1),
        )
        .await
        .unwrap();

        // then (期待する結果):
        let alice = UserId::try_from("alice").unwrap();
        let bob = UserId::try_from("bob").unwrap();
        assert_eq!(authenticator.authenticate("t-bob").await, Ok(bob.clone()));
        assert!(users.find_by_email("alice@example.com").await.unwrap().is_some());
        assert!(
            conversations
                .find_between(&alice, &bob)
                .await
                .unwrap()
                .is_some()
        );
        let friendship = friend_requests.find_between(&bob, &alice).await.unwrap().unwrap();
        assert_eq!(friendship.status, FriendshipStatus::Accepted);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        // テスト項目: 壊れた JSON はパースエラーとして報告される
        // when (操作):
        let result = Seed::from_json("{ not json");

        // then (期待する結果):
        assert!(matches!(result, Err(SeedError::Json(_))));
    }

    #[tokio::test]
    async fn test_invalid_identifier_is_reported() {
        // テスト項目: 不正な ID を含むシードは Invalid エラーになる
        // given (前提条件):
        let seed = Seed::from_json(
            r#"{"users": [{"id": "bad id", "username": "x", "name": "X", "token": "t"}]}"#,
        )
        .unwrap();
        let users = InMemoryUserRepository::new();
        let conversations = InMemoryConversationRepository::new();
        let friend_requests = InMemoryFriendRequestRepository::new();
        let authenticator = StaticTokenAuthenticator::new();

        // when (操作):
        let result = seed
            .apply(
                SeedTargets {
                    users: &users,
                    conversations: &conversations,
                    friend_requests: &friend_requests,
                    authenticator: &authenticator,
                },
                Timestamp::new(1),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SeedError::Invalid(_))));
    }
}
