//! UseCase: フレンドリクエストの送信・応答
//!
//! 状態遷移は REST 側で行い、リレーは相手に ID だけのヒントを配信する。
//! クライアントはヒントを受けて REST で一覧を取り直す。

use std::sync::Arc;

use tayori_shared::time::Clock;

use crate::domain::{
    Conversation, ConversationId, ConversationRepository, FriendRequest, FriendRequestId,
    FriendRequestRepository, FriendshipStatus, MessagePushError, MessagePusher, Notification,
    Timestamp, User, UserId, UserRepository, Username,
};

use super::error::FriendRequestError;

/// 送信処理で何が起きたか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// 新しいリクエストを作成した
    Created,
    /// 拒否済みのリクエストを pending に戻した
    Reopened,
    /// 相手から pending のリクエストが来ていたため承認した
    AutoAccepted,
}

impl SendOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Created | Self::Reopened => "Friend request sent",
            Self::AutoAccepted => "Friend request accepted",
        }
    }
}

/// ヒントを配信する（未接続なら何もしない）
async fn push_hint(pusher: &dyn MessagePusher, user_id: &UserId, notification: &Notification) {
    match pusher.push_to(user_id, notification).await {
        Ok(()) => {}
        Err(MessagePushError::ClientNotFound(_)) => {
            tracing::debug!("'{}' is offline, friend hint skipped", user_id);
        }
        Err(e) => tracing::warn!("Failed to push friend hint to '{}': {}", user_id, e),
    }
}

/// 2 人の間に会話がなければ作成する
async fn ensure_conversation(
    conversations: &dyn ConversationRepository,
    a: &UserId,
    b: &UserId,
    now: Timestamp,
) -> Result<(), FriendRequestError> {
    if conversations.find_between(a, b).await?.is_none() {
        let conversation = Conversation::new(ConversationId::generate(), a.clone(), b.clone(), now);
        tracing::info!(
            "Opened conversation {} between '{}' and '{}'",
            conversation.id,
            a,
            b
        );
        conversations.insert(conversation).await?;
    }
    Ok(())
}

pub struct SendFriendRequestUseCase {
    users: Arc<dyn UserRepository>,
    conversations: Arc<dyn ConversationRepository>,
    friend_requests: Arc<dyn FriendRequestRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendFriendRequestUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        conversations: Arc<dyn ConversationRepository>,
        friend_requests: Arc<dyn FriendRequestRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            conversations,
            friend_requests,
            message_pusher,
            clock,
        }
    }

    /// `username_or_email` に `@` が含まれていればメールアドレスとして検索する
    async fn find_target(&self, username_or_email: &str) -> Result<User, FriendRequestError> {
        let needle = username_or_email.trim();
        let user = if needle.contains('@') {
            self.users.find_by_email(&needle.to_lowercase()).await?
        } else {
            match Username::new(needle.to_string()) {
                Ok(username) => self.users.find_by_username(&username).await?,
                Err(_) => None,
            }
        };
        user.ok_or(FriendRequestError::UserNotFound)
    }

    pub async fn execute(
        &self,
        requester: UserId,
        username_or_email: &str,
    ) -> Result<(FriendRequest, SendOutcome), FriendRequestError> {
        let target = self.find_target(username_or_email).await?;
        if target.id == requester {
            return Err(FriendRequestError::SelfRequest);
        }
        let now = Timestamp::new(self.clock.now_millis());

        let Some(mut existing) = self
            .friend_requests
            .find_between(&requester, &target.id)
            .await?
        else {
            let request =
                FriendRequest::pending(FriendRequestId::generate(), requester, target.id, now);
            self.friend_requests.insert(request.clone()).await?;
            push_hint(
                self.message_pusher.as_ref(),
                &request.recipient,
                &Notification::FriendRequestReceived {
                    request_id: request.id.clone(),
                },
            )
            .await;
            return Ok((request, SendOutcome::Created));
        };

        match existing.status {
            FriendshipStatus::Pending if existing.recipient == requester => {
                // 相手からのリクエストを承認する
                existing.status = FriendshipStatus::Accepted;
                existing.acceptance_read = false;
                existing.updated_at = now;
                self.friend_requests.update(existing.clone()).await?;
                ensure_conversation(
                    self.conversations.as_ref(),
                    &existing.requester,
                    &existing.recipient,
                    now,
                )
                .await?;
                push_hint(
                    self.message_pusher.as_ref(),
                    &existing.requester,
                    &Notification::FriendRequestResponded {
                        request_id: existing.id.clone(),
                        accepted: true,
                    },
                )
                .await;
                Ok((existing, SendOutcome::AutoAccepted))
            }
            FriendshipStatus::Pending => Err(FriendRequestError::AlreadyPending),
            FriendshipStatus::Accepted => Err(FriendRequestError::AlreadyFriends),
            FriendshipStatus::Rejected => {
                existing.status = FriendshipStatus::Pending;
                existing.request_read = false;
                existing.updated_at = now;
                self.friend_requests.update(existing.clone()).await?;
                push_hint(
                    self.message_pusher.as_ref(),
                    &existing.recipient,
                    &Notification::FriendRequestReceived {
                        request_id: existing.id.clone(),
                    },
                )
                .await;
                Ok((existing, SendOutcome::Reopened))
            }
        }
    }
}

pub struct RespondFriendRequestUseCase {
    conversations: Arc<dyn ConversationRepository>,
    friend_requests: Arc<dyn FriendRequestRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl RespondFriendRequestUseCase {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        friend_requests: Arc<dyn FriendRequestRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            conversations,
            friend_requests,
            message_pusher,
            clock,
        }
    }

    /// 受信者として pending のリクエストに応答する
    pub async fn execute(
        &self,
        recipient: UserId,
        request_id: FriendRequestId,
        accept: bool,
    ) -> Result<FriendRequest, FriendRequestError> {
        let mut request = self
            .friend_requests
            .find_by_id(&request_id)
            .await?
            .filter(|r| r.recipient == recipient && r.status == FriendshipStatus::Pending)
            .ok_or(FriendRequestError::RequestNotFound)?;
        let now = Timestamp::new(self.clock.now_millis());

        request.request_read = true;
        request.updated_at = now;
        if accept {
            request.status = FriendshipStatus::Accepted;
            request.acceptance_read = false;
        } else {
            request.status = FriendshipStatus::Rejected;
        }
        self.friend_requests.update(request.clone()).await?;

        if accept {
            ensure_conversation(
                self.conversations.as_ref(),
                &request.requester,
                &request.recipient,
                now,
            )
            .await?;
        }

        push_hint(
            self.message_pusher.as_ref(),
            &request.requester,
            &Notification::FriendRequestResponded {
                request_id: request.id.clone(),
                accepted: accept,
            },
        )
        .await;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::dto::websocket::{FriendRequestHint, FriendResponseHint, ServerEvent},
        usecase::test_support::{Fixture, user_id},
    };

    fn send_usecase(fixture: &Fixture) -> SendFriendRequestUseCase {
        SendFriendRequestUseCase::new(
            fixture.users.clone(),
            fixture.conversations.clone(),
            fixture.friend_requests.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        )
    }

    fn respond_usecase(fixture: &Fixture) -> RespondFriendRequestUseCase {
        RespondFriendRequestUseCase::new(
            fixture.conversations.clone(),
            fixture.friend_requests.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_send_friend_request_by_username_and_email() {
        // テスト項目: ユーザー名またはメールアドレスでリクエストを送ると受信者にヒントが届く
        // given (前提条件):
        let fixture = Fixture::new().await;
        let (_c, mut carol_inbox) = fixture.attach("carol").await;
        let usecase = send_usecase(&fixture);

        // when (操作):
        let (request, outcome) = usecase.execute(user_id("alice"), "carol").await.unwrap();
        let (by_email, _) = usecase
            .execute(user_id("bob"), "Carol@Example.com")
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome, SendOutcome::Created);
        assert_eq!(request.status, FriendshipStatus::Pending);
        assert!(!request.request_read);
        assert_eq!(by_email.recipient, user_id("carol"));
        assert_eq!(
            carol_inbox.drain(),
            vec![
                ServerEvent::FriendRequestReceived(FriendRequestHint {
                    request_id: request.id.to_string()
                }),
                ServerEvent::FriendRequestReceived(FriendRequestHint {
                    request_id: by_email.id.to_string()
                }),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_friend_request_rejections() {
        // テスト項目: 存在しないユーザー・自分自身・重複したリクエストはエラーになる
        // given (前提条件):
        let fixture = Fixture::new().await;
        let usecase = send_usecase(&fixture);
        usecase.execute(user_id("alice"), "carol").await.unwrap();

        // when (操作) / then (期待する結果):
        assert_eq!(
            usecase.execute(user_id("alice"), "nobody").await,
            Err(FriendRequestError::UserNotFound)
        );
        assert_eq!(
            usecase.execute(user_id("alice"), "alice").await,
            Err(FriendRequestError::SelfRequest)
        );
        assert_eq!(
            usecase.execute(user_id("alice"), "carol").await,
            Err(FriendRequestError::AlreadyPending)
        );
    }

    #[tokio::test]
    async fn test_reciprocal_request_auto_accepts() {
        // テスト項目: 相手から pending のリクエストがあれば自動で承認され、会話が作られる
        // given (前提条件):
        let fixture = Fixture::new().await;
        let usecase = send_usecase(&fixture);
        let (original, _) = usecase.execute(user_id("alice"), "carol").await.unwrap();
        let (_a, mut alice_inbox) = fixture.attach("alice").await;

        // when (操作):
        let (accepted, outcome) = usecase.execute(user_id("carol"), "alice").await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome, SendOutcome::AutoAccepted);
        assert_eq!(accepted.id, original.id);
        assert_eq!(accepted.status, FriendshipStatus::Accepted);
        assert!(!accepted.acceptance_read);
        assert!(
            fixture
                .conversations
                .find_between(&user_id("alice"), &user_id("carol"))
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(
            alice_inbox.drain(),
            vec![ServerEvent::FriendRequestResponded(FriendResponseHint {
                request_id: original.id.to_string(),
                accepted: true,
            })]
        );
        assert_eq!(
            usecase.execute(user_id("alice"), "carol").await,
            Err(FriendRequestError::AlreadyFriends)
        );
    }

    #[tokio::test]
    async fn test_respond_accept_and_reject() {
        // テスト項目: 受信者の承認で会話が作られ、拒否後の再送で pending に戻る
        // given (前提条件):
        let fixture = Fixture::new().await;
        let send = send_usecase(&fixture);
        let respond = respond_usecase(&fixture);
        let (request, _) = send.execute(user_id("carol"), "bob").await.unwrap();
        let (_c, mut carol_inbox) = fixture.attach("carol").await;

        // when (操作): 拒否
        let rejected = respond
            .execute(user_id("bob"), request.id.clone(), false)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(rejected.status, FriendshipStatus::Rejected);
        assert!(rejected.request_read);
        assert!(matches!(
            &carol_inbox.drain()[..],
            [ServerEvent::FriendRequestResponded(FriendResponseHint { accepted: false, .. })]
        ));

        // when (操作): 再送して承認
        let (reopened, outcome) = send.execute(user_id("carol"), "bob").await.unwrap();
        let accepted = respond
            .execute(user_id("bob"), reopened.id.clone(), true)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome, SendOutcome::Reopened);
        assert_eq!(accepted.status, FriendshipStatus::Accepted);
        assert!(
            fixture
                .conversations
                .find_between(&user_id("bob"), &user_id("carol"))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_respond_requires_pending_recipient() {
        // テスト項目: 送信者自身の応答や処理済みリクエストへの応答は RequestNotFound になる
        // given (前提条件):
        let fixture = Fixture::new().await;
        let send = send_usecase(&fixture);
        let respond = respond_usecase(&fixture);
        let (request, _) = send.execute(user_id("alice"), "carol").await.unwrap();

        // when (操作) / then (期待する結果):
        assert_eq!(
            respond.execute(user_id("alice"), request.id.clone(), true).await,
            Err(FriendRequestError::RequestNotFound)
        );
        respond
            .execute(user_id("carol"), request.id.clone(), true)
            .await
            .unwrap();
        assert_eq!(
            respond.execute(user_id("carol"), request.id.clone(), false).await,
            Err(FriendRequestError::RequestNotFound)
        );
    }

    #[tokio::test]
    async fn test_accept_reuses_existing_conversation() {
        // テスト項目: 既に会話がある 2 人の承認では会話を増やさない
        // given (前提条件): alice と bob には会話 c1 がある
        let fixture = Fixture::new().await;
        let send = send_usecase(&fixture);
        let respond = respond_usecase(&fixture);
        let (request, _) = send.execute(user_id("alice"), "bob").await.unwrap();

        // when (操作):
        respond.execute(user_id("bob"), request.id, true).await.unwrap();

        // then (期待する結果):
        let chats = fixture.conversations.list_for_user(&user_id("alice")).await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].id.as_str(), "c1");
    }
}
