//! UseCase: フレンド通知の既読化
//!
//! リクエスト通知を確認済みにした場合は送信者に `friend:request:seen` を、
//! 本人（他の端末）には `friend:notifications:cleared` を配信する。

use std::sync::Arc;

use tayori_shared::time::Clock;

use crate::domain::{
    FriendRequestId, FriendRequestRepository, MessagePushError, MessagePusher, Notification,
    NotificationKind, Timestamp, UserId,
};

use super::error::FriendRequestError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedCounts {
    pub requests: u64,
    pub acceptances: u64,
}

impl ClearedCounts {
    pub fn total(&self) -> u64 {
        self.requests + self.acceptances
    }
}

pub struct MarkNotificationsReadUseCase {
    friend_requests: Arc<dyn FriendRequestRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl MarkNotificationsReadUseCase {
    pub fn new(
        friend_requests: Arc<dyn FriendRequestRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            friend_requests,
            message_pusher,
            clock,
        }
    }

    async fn push(&self, user_id: &UserId, notification: &Notification) {
        match self.message_pusher.push_to(user_id, notification).await {
            Ok(()) | Err(MessagePushError::ClientNotFound(_)) => {}
            Err(e) => tracing::warn!("Failed to push to '{}': {}", user_id, e),
        }
    }

    /// `ids` を指定した場合はその通知だけを既読にする
    pub async fn execute(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        ids: Option<Vec<FriendRequestId>>,
    ) -> Result<ClearedCounts, FriendRequestError> {
        let now = Timestamp::new(self.clock.now_millis());
        let mut counts = ClearedCounts::default();

        if kind.includes_requests() {
            let seen = self
                .friend_requests
                .mark_requests_read(&user_id, ids.clone(), now)
                .await?;
            counts.requests = seen.len() as u64;
            for request in &seen {
                self.push(
                    &request.requester,
                    &Notification::FriendRequestSeen {
                        request_id: request.id.clone(),
                    },
                )
                .await;
            }
        }

        if kind.includes_acceptances() {
            let cleared = self
                .friend_requests
                .mark_acceptances_read(&user_id, ids, now)
                .await?;
            counts.acceptances = cleared.len() as u64;
        }

        if counts.total() > 0 {
            self.push(
                &user_id,
                &Notification::FriendNotificationsCleared {
                    kind,
                    count: counts.total(),
                },
            )
            .await;
        }
        tracing::debug!(
            "'{}' cleared {} friend notifications ({})",
            user_id,
            counts.total(),
            kind.as_str()
        );

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{FriendRequest, FriendshipStatus},
        infrastructure::dto::websocket::{FriendRequestHint, NotificationsClearedHint, ServerEvent},
        usecase::test_support::{Fixture, NOW, user_id},
    };

    fn request_id(id: &str) -> FriendRequestId {
        FriendRequestId::try_from(id).unwrap()
    }

    async fn seed(fixture: &Fixture) {
        // r1: alice → bob (pending), r2: carol → bob (pending), r3: bob → carol (accepted, 未確認)
        for (id, from, to) in [("r1", "alice", "bob"), ("r2", "carol", "bob"), ("r3", "bob", "carol")] {
            let mut request = FriendRequest::pending(
                request_id(id),
                user_id(from),
                user_id(to),
                Timestamp::new(NOW),
            );
            if id == "r3" {
                request.status = FriendshipStatus::Accepted;
                request.request_read = true;
                request.acceptance_read = false;
            }
            fixture.friend_requests.insert(request).await.unwrap();
        }
    }

    fn usecase(fixture: &Fixture) -> MarkNotificationsReadUseCase {
        MarkNotificationsReadUseCase::new(
            fixture.friend_requests.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_mark_all_notifications_read() {
        // テスト項目: all で両方の通知が既読になり、送信者と本人にヒントが届く
        // given (前提条件):
        let fixture = Fixture::new().await;
        seed(&fixture).await;
        let (_a, mut alice_inbox) = fixture.attach("alice").await;
        let (_b, mut bob_inbox) = fixture.attach("bob").await;

        // when (操作):
        let counts = usecase(&fixture)
            .execute(user_id("bob"), NotificationKind::All, None)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(counts, ClearedCounts { requests: 2, acceptances: 1 });
        assert_eq!(
            alice_inbox.drain(),
            vec![ServerEvent::FriendRequestSeen(FriendRequestHint {
                request_id: "r1".to_string()
            })]
        );
        assert_eq!(
            bob_inbox.drain(),
            vec![ServerEvent::FriendNotificationsCleared(NotificationsClearedHint {
                kind: "all".to_string(),
                count: 3,
            })]
        );
    }

    #[tokio::test]
    async fn test_mark_selected_requests_read() {
        // テスト項目: ids を指定するとその通知だけが既読になり、2 回目は 0 件で配信もない
        // given (前提条件):
        let fixture = Fixture::new().await;
        seed(&fixture).await;
        let usecase = usecase(&fixture);

        // when (操作):
        let first = usecase
            .execute(user_id("bob"), NotificationKind::Requests, Some(vec![request_id("r2")]))
            .await
            .unwrap();
        let (_b, mut bob_inbox) = fixture.attach("bob").await;
        let second = usecase
            .execute(user_id("bob"), NotificationKind::Requests, Some(vec![request_id("r2")]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first.total(), 1);
        assert_eq!(second.total(), 0);
        assert!(bob_inbox.drain().is_empty());
        let r1 = fixture.friend_requests.find_by_id(&request_id("r1")).await.unwrap().unwrap();
        assert!(!r1.request_read);
    }
}
