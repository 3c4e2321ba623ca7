//! Domain layer errors.

use thiserror::Error;

/// Value Object 生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    #[error("{0} must be at most {1} bytes")]
    IdentifierTooLong(&'static str, usize),

    #[error("{0} contains invalid characters: '{1}'")]
    InvalidIdentifier(&'static str, String),

    #[error("message text must not be empty")]
    EmptyMessage,

    #[error("message text must be at most {0} characters")]
    MessageTooLong(usize),

    #[error("invalid username: '{0}'")]
    InvalidUsername(String),
}

/// Repository（永続化層）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("friend request not found: {0}")]
    FriendRequestNotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// MessagePusher（通知層）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client not connected: {0}")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// 認証ハンドシェイクのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid bearer token")]
    InvalidToken,
}
