//! Conversion logic from domain entities / notifications to DTOs.

use tayori_shared::time::{format_clock_time, timestamp_to_rfc3339};

use crate::domain::{
    FriendRequest, FriendshipStatus, Message, Notification, User, UserStatus,
};
use crate::infrastructure::dto::{http, websocket as ws};

pub fn status_str(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Online => "online",
        UserStatus::Offline => "offline",
    }
}

pub fn friendship_status_str(status: FriendshipStatus) -> &'static str {
    match status {
        FriendshipStatus::Pending => "pending",
        FriendshipStatus::Accepted => "accepted",
        FriendshipStatus::Rejected => "rejected",
    }
}

impl From<&User> for http::UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            name: user.name.clone(),
            status: status_str(user.status).to_string(),
        }
    }
}

impl From<&Message> for http::MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            text: message.text.as_str().to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender: message.sender_id.to_string(),
            time: format_clock_time(message.created_at.value()),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
            read: message.read,
        }
    }
}

impl From<&FriendRequest> for http::FriendshipDto {
    fn from(request: &FriendRequest) -> Self {
        Self {
            id: request.id.to_string(),
            requester: request.requester.to_string(),
            recipient: request.recipient.to_string(),
            status: friendship_status_str(request.status).to_string(),
            request_read: request.request_read,
            acceptance_read: request.acceptance_read,
        }
    }
}

fn message_payload(message: &Message, in_active_chat: bool) -> ws::MessagePayload {
    ws::MessagePayload {
        id: message.id.to_string(),
        text: message.text.as_str().to_string(),
        conversation_id: message.conversation_id.to_string(),
        sender: message.sender_id.to_string(),
        time: format_clock_time(message.created_at.value()),
        created_at: timestamp_to_rfc3339(message.created_at.value()),
        read: message.read,
        is_in_active_chat: in_active_chat,
    }
}

impl From<&Notification> for ws::ServerEvent {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::UserOnline { user_id } => Self::UserOnline(ws::PresencePayload {
                user_id: user_id.to_string(),
            }),
            Notification::UserOffline { user_id } => Self::UserOffline(ws::PresencePayload {
                user_id: user_id.to_string(),
            }),
            Notification::Typing {
                conversation_id,
                user_id,
                is_typing,
            } => Self::Typing(ws::TypingPayload {
                conversation_id: conversation_id.to_string(),
                user_id: user_id.to_string(),
                is_typing: *is_typing,
            }),
            Notification::MessageReceived {
                message,
                in_active_chat,
            } => Self::MessageReceive(message_payload(message, *in_active_chat)),
            Notification::MessagesRead {
                conversation_id,
                message_ids,
                read_by,
            } => Self::MessageReadAck(ws::ReadAckPayload {
                conversation_id: conversation_id.to_string(),
                message_ids: message_ids.iter().map(|id| id.to_string()).collect(),
                read_by: read_by.to_string(),
            }),
            Notification::ChatUpdated {
                conversation_id,
                last_message,
                updated_at,
            } => Self::ChatMessageUpdate(ws::ChatUpdatePayload {
                id: conversation_id.to_string(),
                last_message: last_message.clone(),
                timestamp: format_clock_time(updated_at.value()),
                updated_at: timestamp_to_rfc3339(updated_at.value()),
            }),
            Notification::FriendRequestReceived { request_id } => {
                Self::FriendRequestReceived(ws::FriendRequestHint {
                    request_id: request_id.to_string(),
                })
            }
            Notification::FriendRequestResponded {
                request_id,
                accepted,
            } => Self::FriendRequestResponded(ws::FriendResponseHint {
                request_id: request_id.to_string(),
                accepted: *accepted,
            }),
            Notification::FriendRequestSeen { request_id } => {
                Self::FriendRequestSeen(ws::FriendRequestHint {
                    request_id: request_id.to_string(),
                })
            }
            Notification::FriendNotificationsCleared { kind, count } => {
                Self::FriendNotificationsCleared(ws::NotificationsClearedHint {
                    kind: kind.as_str().to_string(),
                    count: *count,
                })
            }
        }
    }
}
