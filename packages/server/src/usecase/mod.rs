//! UseCase layer
//!
//! 1 つの操作につき 1 つの構造体。依存は `Arc<dyn Trait>` で受け取り、
//! 配信先と通知内容（`Notification`）を決めるところまでを担当する。

mod connect_user;
mod disconnect_user;
pub mod error;
mod friend_query;
mod friend_request;
mod get_chat_list;
mod get_messages;
mod get_user;
mod mark_notifications_read;
mod mark_read;
mod select_conversation;
mod send_message;
mod update_typing;

#[cfg(test)]
mod test_support;

pub use connect_user::{ConnectUserUseCase, ConnectionTicket};
pub use disconnect_user::{DisconnectOutcome, DisconnectUserUseCase};
pub use error::{FriendRequestError, MarkReadError, QueryError, SendMessageError};
pub use friend_query::{
    FriendEntry, FriendNotifications, FriendQueryUseCase, FriendRequestList, RequestDirection,
};
pub use friend_request::{RespondFriendRequestUseCase, SendFriendRequestUseCase, SendOutcome};
pub use get_chat_list::{ChatSummary, GetChatListUseCase};
pub use get_messages::GetMessagesUseCase;
pub use get_user::GetUserUseCase;
pub use mark_notifications_read::{ClearedCounts, MarkNotificationsReadUseCase};
pub use mark_read::MarkReadUseCase;
pub use select_conversation::SelectConversationUseCase;
pub use send_message::SendMessageUseCase;
pub use update_typing::{TypingOutcome, UpdateTypingUseCase};
