//! WebSocket wire contract.
//!
//! Every text frame is a JSON envelope `{"event": "<name>", "data": {...}}`
//! with camelCase payload fields.

use serde::{Deserialize, Serialize};

/// Event names shared by both directions
pub mod events {
    pub const USER_ONLINE: &str = "user:online";
    pub const USER_OFFLINE: &str = "user:offline";
    pub const USER_TYPING: &str = "user:typing";
    pub const MESSAGE_RECEIVE: &str = "message:receive";
    pub const MESSAGE_READ: &str = "message:read";
    pub const MESSAGE_READ_ACK: &str = "message:read:ack";
    pub const CHAT_MESSAGE_UPDATE: &str = "chat:message:update";
    pub const CHAT_SELECT: &str = "chat:select";
    pub const FRIEND_REQUEST_RECEIVED: &str = "friend:request:received";
    pub const FRIEND_REQUEST_RESPONDED: &str = "friend:request:responded";
    pub const FRIEND_REQUEST_SEEN: &str = "friend:request:seen";
    pub const FRIEND_NOTIFICATIONS_CLEARED: &str = "friend:notifications:cleared";
}

// ========================================
// Client → Server
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "user:typing")]
    Typing(TypingRequest),
    #[serde(rename = "message:read")]
    MessageRead(ReadRequest),
    #[serde(rename = "chat:select")]
    ChatSelect(SelectRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingRequest {
    pub conversation_id: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    /// `None` when the client closed the conversation
    #[serde(default)]
    pub conversation_id: Option<String>,
}

// ========================================
// Server → Client
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "user:online")]
    UserOnline(PresencePayload),
    #[serde(rename = "user:offline")]
    UserOffline(PresencePayload),
    #[serde(rename = "user:typing")]
    Typing(TypingPayload),
    #[serde(rename = "message:receive")]
    MessageReceive(MessagePayload),
    #[serde(rename = "message:read:ack")]
    MessageReadAck(ReadAckPayload),
    #[serde(rename = "chat:message:update")]
    ChatMessageUpdate(ChatUpdatePayload),
    #[serde(rename = "friend:request:received")]
    FriendRequestReceived(FriendRequestHint),
    #[serde(rename = "friend:request:responded")]
    FriendRequestResponded(FriendResponseHint),
    #[serde(rename = "friend:request:seen")]
    FriendRequestSeen(FriendRequestHint),
    #[serde(rename = "friend:notifications:cleared")]
    FriendNotificationsCleared(NotificationsClearedHint),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub conversation_id: String,
    pub user_id: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: String,
    pub text: String,
    pub conversation_id: String,
    /// Sender user id
    pub sender: String,
    /// Short `HH:MM` display time
    pub time: String,
    /// RFC 3339
    pub created_at: String,
    pub read: bool,
    /// Whether the recipient's client has this conversation open
    #[serde(default)]
    pub is_in_active_chat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAckPayload {
    pub conversation_id: String,
    pub message_ids: Vec<String>,
    pub read_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatUpdatePayload {
    /// Conversation id
    pub id: String,
    pub last_message: String,
    /// Short `HH:MM` display time
    pub timestamp: String,
    /// RFC 3339
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestHint {
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendResponseHint {
    pub request_id: String,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsClearedHint {
    /// `requests`, `acceptances` or `all`
    pub kind: String,
    pub count: u64,
}

impl ServerEvent {
    /// The wire event name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserOnline(_) => events::USER_ONLINE,
            Self::UserOffline(_) => events::USER_OFFLINE,
            Self::Typing(_) => events::USER_TYPING,
            Self::MessageReceive(_) => events::MESSAGE_RECEIVE,
            Self::MessageReadAck(_) => events::MESSAGE_READ_ACK,
            Self::ChatMessageUpdate(_) => events::CHAT_MESSAGE_UPDATE,
            Self::FriendRequestReceived(_) => events::FRIEND_REQUEST_RECEIVED,
            Self::FriendRequestResponded(_) => events::FRIEND_REQUEST_RESPONDED,
            Self::FriendRequestSeen(_) => events::FRIEND_REQUEST_SEEN,
            Self::FriendNotificationsCleared(_) => events::FRIEND_NOTIFICATIONS_CLEARED,
        }
    }
}
