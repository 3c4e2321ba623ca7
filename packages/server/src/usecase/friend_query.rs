//! UseCase: フレンド関連の参照（REST の再取得用）
//!
//! - リクエスト一覧（受信・送信）
//! - フレンド一覧
//! - 未確認の通知（リクエスト・承認）

use std::sync::Arc;

use crate::domain::{
    FriendRequest, FriendRequestRepository, FriendshipStatus, NotificationKind, User, UserId,
    UserRepository,
};

use super::error::FriendRequestError;

/// リクエスト一覧の取得方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
    Incoming,
    Outgoing,
    All,
}

impl RequestDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn includes_incoming(&self) -> bool {
        matches!(self, Self::Incoming | Self::All)
    }

    fn includes_outgoing(&self) -> bool {
        matches!(self, Self::Outgoing | Self::All)
    }
}

/// フレンド関係と、要求したユーザーから見た相手
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendEntry {
    pub request: FriendRequest,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendRequestList {
    pub incoming: Option<Vec<FriendEntry>>,
    pub outgoing: Option<Vec<FriendEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendNotifications {
    pub requests: Option<Vec<FriendEntry>>,
    pub acceptances: Option<Vec<FriendEntry>>,
}

impl FriendNotifications {
    pub fn unread_requests(&self) -> usize {
        self.requests.as_ref().map_or(0, Vec::len)
    }

    pub fn unread_acceptances(&self) -> usize {
        self.acceptances.as_ref().map_or(0, Vec::len)
    }
}

/// フレンド参照のユースケース
pub struct FriendQueryUseCase {
    users: Arc<dyn UserRepository>,
    friend_requests: Arc<dyn FriendRequestRepository>,
}

impl FriendQueryUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        friend_requests: Arc<dyn FriendRequestRepository>,
    ) -> Self {
        Self {
            users,
            friend_requests,
        }
    }

    /// 条件に合うレコードを相手のユーザー情報と組にする
    ///
    /// `newest_by_update` が false なら作成日時、true なら更新日時の新しい順。
    async fn entries(
        &self,
        user_id: &UserId,
        filter: impl Fn(&FriendRequest) -> bool,
        newest_by_update: bool,
    ) -> Result<Vec<FriendEntry>, FriendRequestError> {
        let mut requests: Vec<FriendRequest> = self
            .friend_requests
            .list_for_user(user_id)
            .await?
            .into_iter()
            .filter(|r| filter(r))
            .collect();
        requests.sort_by(|a, b| {
            let (ka, kb) = if newest_by_update {
                (a.updated_at, b.updated_at)
            } else {
                (a.created_at, b.created_at)
            };
            kb.cmp(&ka).then_with(|| a.id.cmp(&b.id))
        });

        let mut entries = Vec::with_capacity(requests.len());
        for request in requests {
            let counterpart = request.counterpart(user_id).clone();
            match self.users.find_by_id(&counterpart).await? {
                Some(user) => entries.push(FriendEntry { request, user }),
                None => tracing::warn!(
                    "Friend request {} references unknown user '{}'",
                    request.id,
                    counterpart
                ),
            }
        }
        Ok(entries)
    }

    /// pending のリクエスト一覧（作成日時の新しい順）
    pub async fn requests(
        &self,
        user_id: &UserId,
        direction: RequestDirection,
    ) -> Result<FriendRequestList, FriendRequestError> {
        let mut list = FriendRequestList::default();
        if direction.includes_incoming() {
            list.incoming = Some(
                self.entries(
                    user_id,
                    |r| r.status == FriendshipStatus::Pending && &r.recipient == user_id,
                    false,
                )
                .await?,
            );
        }
        if direction.includes_outgoing() {
            list.outgoing = Some(
                self.entries(
                    user_id,
                    |r| r.status == FriendshipStatus::Pending && &r.requester == user_id,
                    false,
                )
                .await?,
            );
        }
        Ok(list)
    }

    /// 承認済みのフレンド一覧（更新日時の新しい順）
    pub async fn friends(&self, user_id: &UserId) -> Result<Vec<FriendEntry>, FriendRequestError> {
        self.entries(user_id, |r| r.status == FriendshipStatus::Accepted, true)
            .await
    }

    /// 未確認の通知
    pub async fn notifications(
        &self,
        user_id: &UserId,
        kind: NotificationKind,
    ) -> Result<FriendNotifications, FriendRequestError> {
        let mut notifications = FriendNotifications::default();
        if kind.includes_requests() {
            notifications.requests = Some(
                self.entries(
                    user_id,
                    |r| {
                        r.status == FriendshipStatus::Pending
                            && &r.recipient == user_id
                            && !r.request_read
                    },
                    false,
                )
                .await?,
            );
        }
        if kind.includes_acceptances() {
            notifications.acceptances = Some(
                self.entries(
                    user_id,
                    |r| {
                        r.status == FriendshipStatus::Accepted
                            && &r.requester == user_id
                            && !r.acceptance_read
                    },
                    true,
                )
                .await?,
            );
        }
        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{FriendRequestId, Timestamp},
        usecase::test_support::{Fixture, NOW, user_id},
    };

    async fn insert(fixture: &Fixture, id: &str, from: &str, to: &str, status: FriendshipStatus, offset: i64) {
        let mut request = FriendRequest::pending(
            FriendRequestId::try_from(id).unwrap(),
            user_id(from),
            user_id(to),
            Timestamp::new(NOW + offset),
        );
        if status == FriendshipStatus::Accepted {
            request.request_read = true;
            request.acceptance_read = false;
        }
        request.status = status;
        fixture.friend_requests.insert(request).await.unwrap();
    }

    fn ids(entries: &[FriendEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.request.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_requests_by_direction() {
        // テスト項目: 受信・送信のリクエストが方向ごとに新しい順で返る
        // given (前提条件):
        let fixture = Fixture::new().await;
        insert(&fixture, "r1", "alice", "bob", FriendshipStatus::Pending, 1).await;
        insert(&fixture, "r2", "carol", "bob", FriendshipStatus::Pending, 2).await;
        insert(&fixture, "r3", "bob", "carol", FriendshipStatus::Rejected, 3).await;
        let usecase = FriendQueryUseCase::new(fixture.users.clone(), fixture.friend_requests.clone());

        // when (操作):
        let all = usecase.requests(&user_id("bob"), RequestDirection::All).await.unwrap();
        let outgoing = usecase
            .requests(&user_id("alice"), RequestDirection::Outgoing)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(ids(all.incoming.as_deref().unwrap()), vec!["r2", "r1"]);
        assert_eq!(all.outgoing.as_deref().map(ids), Some(vec![]));
        assert_eq!(all.incoming.as_ref().unwrap()[0].user.id, user_id("carol"));
        assert_eq!(outgoing.incoming, None);
        assert_eq!(ids(outgoing.outgoing.as_deref().unwrap()), vec!["r1"]);
    }

    #[tokio::test]
    async fn test_friends_and_notifications() {
        // テスト項目: 承認済みのフレンドと未確認の通知が取得できる
        // given (前提条件):
        let fixture = Fixture::new().await;
        insert(&fixture, "r1", "alice", "bob", FriendshipStatus::Accepted, 1).await;
        insert(&fixture, "r2", "carol", "alice", FriendshipStatus::Pending, 2).await;
        let usecase = FriendQueryUseCase::new(fixture.users.clone(), fixture.friend_requests.clone());

        // when (操作):
        let friends = usecase.friends(&user_id("alice")).await.unwrap();
        let notifications = usecase
            .notifications(&user_id("alice"), NotificationKind::All)
            .await
            .unwrap();
        let only_requests = usecase
            .notifications(&user_id("alice"), NotificationKind::Requests)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].user.id, user_id("bob"));
        assert_eq!(notifications.unread_requests(), 1);
        assert_eq!(notifications.unread_acceptances(), 1);
        assert_eq!(only_requests.acceptances, None);
        assert_eq!(only_requests.unread_requests(), 1);
    }

    #[test]
    fn test_request_direction_parse() {
        // テスト項目: 方向の文字列が解釈され、未知の値は None になる
        // then (期待する結果):
        assert_eq!(RequestDirection::parse("incoming"), Some(RequestDirection::Incoming));
        assert_eq!(RequestDirection::parse("all"), Some(RequestDirection::All));
        assert_eq!(RequestDirection::parse("sideways"), None);
    }
}
