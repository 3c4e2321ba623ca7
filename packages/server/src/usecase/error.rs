//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RepositoryError;

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("conversation not found")]
    ConversationNotFound,

    #[error("sender is not a participant of the conversation")]
    NotParticipant,

    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 既読処理のエラー（ソケット経由の場合は黙って破棄される）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkReadError {
    #[error("conversation not found")]
    ConversationNotFound,

    #[error("reader is not a participant of the conversation")]
    NotParticipant,

    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 参照系（REST の再取得）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// フレンドリクエスト関連のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FriendRequestError {
    #[error("user not found")]
    UserNotFound,

    #[error("cannot send friend request to yourself")]
    SelfRequest,

    #[error("friend request already pending")]
    AlreadyPending,

    #[error("already friends with this user")]
    AlreadyFriends,

    #[error("friend request not found or already processed")]
    RequestNotFound,

    #[error("invalid direction: '{0}'")]
    InvalidDirection(String),

    #[error("invalid notification type: '{0}'")]
    InvalidNotificationType(String),

    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}
