//! Outbound relay notifications.
//!
//! UseCase 層はこの列挙型で「誰に何を知らせるか」だけを決め、
//! ワイヤ形式（イベント名・JSON）への変換は Infrastructure 層が行う。

use super::{
    entity::Message,
    value_object::{ConversationId, FriendRequestId, MessageId, Timestamp, UserId},
};

/// 通知のクリア対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Requests,
    Acceptances,
    All,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requests => "requests",
            Self::Acceptances => "acceptances",
            Self::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "requests" => Some(Self::Requests),
            "acceptances" => Some(Self::Acceptances),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn includes_requests(&self) -> bool {
        matches!(self, Self::Requests | Self::All)
    }

    pub fn includes_acceptances(&self) -> bool {
        matches!(self, Self::Acceptances | Self::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    UserOnline {
        user_id: UserId,
    },
    UserOffline {
        user_id: UserId,
    },
    Typing {
        conversation_id: ConversationId,
        user_id: UserId,
        is_typing: bool,
    },
    MessageReceived {
        message: Message,
        /// 受信者のクライアントがこの会話を開いているか
        in_active_chat: bool,
    },
    MessagesRead {
        conversation_id: ConversationId,
        message_ids: Vec<MessageId>,
        read_by: UserId,
    },
    ChatUpdated {
        conversation_id: ConversationId,
        last_message: String,
        updated_at: Timestamp,
    },
    FriendRequestReceived {
        request_id: FriendRequestId,
    },
    FriendRequestResponded {
        request_id: FriendRequestId,
        accepted: bool,
    },
    FriendRequestSeen {
        request_id: FriendRequestId,
    },
    FriendNotificationsCleared {
        kind: NotificationKind,
        count: u64,
    },
}
