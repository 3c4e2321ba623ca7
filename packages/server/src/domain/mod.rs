//! Domain layer
//!
//! - Value objects / entities
//! - Repository・MessagePusher・Authenticator の trait（実装は Infrastructure 層）
//! - 接続ごとの揮発性状態（ConnectionManager, TypingState）
//! - キー単位のロック（KeyedLock）

pub mod auth;
pub mod connection;
pub mod entity;
pub mod error;
pub mod lock;
pub mod message_pusher;
pub mod notification;
pub mod repository;
pub mod typing;
pub mod value_object;

pub use auth::Authenticator;
pub use connection::{ConnectionManager, ConnectionRecord, OpenOutcome};
pub use entity::{Conversation, FriendRequest, FriendshipStatus, Message, User, UserStatus};
pub use error::{AuthError, MessagePushError, RepositoryError, ValueObjectError};
pub use lock::{ConversationLocks, KeyedLock};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notification::{Notification, NotificationKind};
pub use repository::{
    ConversationRepository, FriendRequestRepository, MessageRepository, UserRepository,
};
pub use typing::TypingState;
pub use value_object::{
    ConnectionId, ConversationId, FriendRequestId, MessageId, MessageText, Timestamp, UserId,
    Username,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::{MockMessageRepository, MockUserRepository};
