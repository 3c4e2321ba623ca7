//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェース。
//! 具体的な実装は Infrastructure 層が提供する（依存性の逆転）。
//! リレー層のロジックはこれらの trait にのみ依存するため、
//! フェイクのストアで単体テストできる。

use async_trait::async_trait;

use super::{
    RepositoryError,
    entity::{Conversation, FriendRequest, Message, User, UserStatus},
    value_object::{ConversationId, FriendRequestId, MessageId, Timestamp, UserId, Username},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &Username)
    -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// オンライン状態を永続化する
    async fn set_status(&self, user_id: &UserId, status: UserStatus)
    -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn insert(&self, conversation: Conversation) -> Result<(), RepositoryError>;

    async fn find_by_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// 2 人のユーザー間の会話を探す
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// ユーザーが参加している会話（更新日時の新しい順）
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Conversation>, RepositoryError>;

    /// 新しいメッセージを会話に反映する（lastMessage・updatedAt・受信者の未読数 +1）
    async fn record_message(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        recipient: &UserId,
        at: Timestamp,
    ) -> Result<Conversation, RepositoryError>;

    /// ユーザーの未読数を 0 にする
    async fn reset_unread(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: Message) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, message_id: &MessageId) -> Result<Option<Message>, RepositoryError>;

    /// 会話のメッセージ履歴（作成順）
    async fn list_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// `author` が送信した未読メッセージを一括で既読にし、既読にした ID を返す
    async fn mark_read_from(
        &self,
        conversation_id: &ConversationId,
        author: &UserId,
    ) -> Result<Vec<MessageId>, RepositoryError>;
}

#[async_trait]
pub trait FriendRequestRepository: Send + Sync {
    async fn insert(&self, request: FriendRequest) -> Result<(), RepositoryError>;

    /// 既存のレコードを置き換える
    async fn update(&self, request: FriendRequest) -> Result<(), RepositoryError>;

    async fn find_by_id(
        &self,
        request_id: &FriendRequestId,
    ) -> Result<Option<FriendRequest>, RepositoryError>;

    /// どちらの方向でも、2 人の間のフレンド関係を探す
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<FriendRequest>, RepositoryError>;

    /// ユーザーが requester / recipient のいずれかであるレコード
    async fn list_for_user(&self, user_id: &UserId)
    -> Result<Vec<FriendRequest>, RepositoryError>;

    /// 受信者宛ての未確認の pending リクエストを確認済みにし、更新したレコードを返す
    ///
    /// `ids` が指定された場合はその ID に限定する。
    async fn mark_requests_read(
        &self,
        recipient: &UserId,
        ids: Option<Vec<FriendRequestId>>,
        at: Timestamp,
    ) -> Result<Vec<FriendRequest>, RepositoryError>;

    /// 送信者の未確認の承認通知を確認済みにし、更新したレコードを返す
    async fn mark_acceptances_read(
        &self,
        requester: &UserId,
        ids: Option<Vec<FriendRequestId>>,
        at: Timestamp,
    ) -> Result<Vec<FriendRequest>, RepositoryError>;
}
