//! Domain entities
//!
//! 永続化されるレコード（ユーザー・会話・メッセージ・フレンドリクエスト）。
//! リレー層はこれらを参照するだけで、ライフサイクルは REST 側が持つ。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::value_object::{
    ConversationId, FriendRequestId, MessageId, MessageText, Timestamp, UserId, Username,
};

/// ユーザーのオンライン状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Option<String>,
    pub name: String,
    pub status: UserStatus,
}

impl User {
    pub fn new(id: UserId, username: Username, name: String) -> Self {
        Self {
            id,
            username,
            email: None,
            name,
            status: UserStatus::Offline,
        }
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email.trim().to_lowercase());
        self
    }
}

/// 2 人の参加者による会話
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: [UserId; 2],
    pub last_message: Option<MessageId>,
    /// 参加者ごとの未読数
    pub unread_count: HashMap<UserId, u32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Conversation {
    pub fn new(id: ConversationId, a: UserId, b: UserId, created_at: Timestamp) -> Self {
        Self {
            id,
            participants: [a, b],
            last_message: None,
            unread_count: HashMap::new(),
            created_at,
            updated_at: created_at,
        }
    }

    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// `user_id` から見た相手の参加者を返す（参加者でなければ None）
    pub fn other_participant(&self, user_id: &UserId) -> Option<&UserId> {
        match &self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }

    /// `user_id` 以外の参加者（typing などのファンアウト先）
    pub fn others(&self, user_id: &UserId) -> Vec<UserId> {
        self.participants
            .iter()
            .filter(|id| *id != user_id)
            .cloned()
            .collect()
    }

    pub fn unread_for(&self, user_id: &UserId) -> u32 {
        self.unread_count.get(user_id).copied().unwrap_or(0)
    }

    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        self.has_participant(a) && self.has_participant(b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub text: MessageText,
    pub read: bool,
    pub created_at: Timestamp,
}

/// フレンドリクエストの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub requester: UserId,
    pub recipient: UserId,
    pub status: FriendshipStatus,
    /// 受信者がリクエスト通知を確認したか
    pub request_read: bool,
    /// 送信者が承認通知を確認したか
    pub acceptance_read: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FriendRequest {
    pub fn pending(
        id: FriendRequestId,
        requester: UserId,
        recipient: UserId,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            requester,
            recipient,
            status: FriendshipStatus::Pending,
            request_read: false,
            acceptance_read: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.requester == user_id || &self.recipient == user_id
    }

    /// `user_id` から見た相手
    pub fn counterpart(&self, user_id: &UserId) -> &UserId {
        if &self.requester == user_id {
            &self.recipient
        } else {
            &self.requester
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    fn conversation() -> Conversation {
        Conversation::new(
            ConversationId::try_from("c1").unwrap(),
            user("alice"),
            user("bob"),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_other_participant() {
        // テスト項目: 参加者から見た相手が取得でき、部外者には None が返る
        // given (前提条件):
        let conversation = conversation();

        // when (操作) / then (期待する結果):
        assert_eq!(conversation.other_participant(&user("alice")), Some(&user("bob")));
        assert_eq!(conversation.other_participant(&user("bob")), Some(&user("alice")));
        assert_eq!(conversation.other_participant(&user("carol")), None);
    }

    #[test]
    fn test_others_excludes_sender() {
        // テスト項目: ファンアウト先から送信者自身が除外される
        // given (前提条件):
        let conversation = conversation();

        // when (操作):
        let others = conversation.others(&user("alice"));

        // then (期待する結果):
        assert_eq!(others, vec![user("bob")]);
    }

    #[test]
    fn test_unread_for_defaults_to_zero() {
        // テスト項目: 未読数が未設定の参加者は 0 として扱われる
        // given (前提条件):
        let mut conversation = conversation();
        conversation.unread_count.insert(user("bob"), 3);

        // then (期待する結果):
        assert_eq!(conversation.unread_for(&user("bob")), 3);
        assert_eq!(conversation.unread_for(&user("alice")), 0);
    }

    #[test]
    fn test_friend_request_counterpart() {
        // テスト項目: フレンドリクエストの相手側ユーザーが取得できる
        // given (前提条件):
        let request = FriendRequest::pending(
            FriendRequestId::try_from("f1").unwrap(),
            user("alice"),
            user("bob"),
            Timestamp::new(1),
        );

        // then (期待する結果):
        assert_eq!(request.counterpart(&user("alice")), &user("bob"));
        assert_eq!(request.counterpart(&user("bob")), &user("alice"));
        assert!(request.involves(&user("bob")));
        assert!(!request.involves(&user("carol")));
        assert!(!request.request_read);
    }
}
