//! Message formatting utilities for client display.

use tayori_server::infrastructure::dto::{
    http::{FriendRequestsDto, MessageDto, NotificationsDto, UserDto},
    websocket::ServerEvent,
};

use crate::store::ChatStore;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    pub fn format_welcome(me: &UserDto) -> String {
        format!(
            "\nYou are '{}' (@{}). Type /list to see your chats, /open <id> to start.\n",
            me.name, me.username
        )
    }

    /// Format the chat list with presence and unread counters
    pub fn format_chat_list(store: &ChatStore) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\nChats:\n", RULE));

        if store.chats().is_empty() {
            output.push_str("(No chats)\n");
        } else {
            for chat in store.chats() {
                let presence = if store.is_online(&chat.participant.id) {
                    "online"
                } else {
                    "offline"
                };
                let active = if store.active() == Some(chat.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                let unread = if chat.unread > 0 {
                    format!(" [{} unread]", chat.unread)
                } else {
                    String::new()
                };
                let last = chat.last_message.as_deref().unwrap_or("");
                output.push_str(&format!(
                    "{} {}  {} ({}){}  {}\n",
                    active, chat.id, chat.participant.name, presence, unread, last
                ));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format the stored history of one conversation
    pub fn format_history(store: &ChatStore, conversation_id: &str) -> String {
        let mut output = String::new();
        let title = store
            .chat(conversation_id)
            .map(|chat| chat.participant.name.as_str())
            .unwrap_or(conversation_id);
        output.push_str(&format!("\n{}\nConversation with {}\n", RULE, title));

        let messages = store.messages(conversation_id);
        if messages.is_empty() {
            output.push_str("(No messages)\n");
        }
        for message in messages {
            output.push_str(&Self::format_message(message, store.me()));
            output.push('\n');
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format a single message. Own messages carry a receipt mark.
    pub fn format_message(message: &MessageDto, me: &str) -> String {
        if message.sender == me {
            let receipt = if message.read { "read" } else { "sent" };
            format!("[{}] me: {} ({})", message.time, message.text, receipt)
        } else {
            format!("[{}] @{}: {}", message.time, message.sender, message.text)
        }
    }

    /// Format a server event after it has been applied to the store.
    ///
    /// Returns `None` for events that are only reflected in state.
    pub fn format_event(event: &ServerEvent, store: &ChatStore) -> Option<String> {
        match event {
            ServerEvent::UserOnline(p) => Some(format!("\n+ {} is online\n", p.user_id)),
            ServerEvent::UserOffline(p) => Some(format!("\n- {} went offline\n", p.user_id)),
            ServerEvent::Typing(p) => {
                if store.active() != Some(p.conversation_id.as_str()) {
                    return None;
                }
                let users = store.typing_users(&p.conversation_id);
                if users.is_empty() {
                    return None;
                }
                Some(format!("\n... {} typing\n", users.join(", ")))
            }
            ServerEvent::MessageReceive(p) => {
                if store.active() == Some(p.conversation_id.as_str()) {
                    let message = store
                        .messages(&p.conversation_id)
                        .iter()
                        .find(|m| m.id == p.id)?;
                    Some(format!("\n{}\n", Self::format_message(message, store.me())))
                } else {
                    let unread = store
                        .chat(&p.conversation_id)
                        .map(|chat| chat.unread)
                        .unwrap_or(1);
                    Some(format!(
                        "\n* new message from @{} in {} ({} unread)\n",
                        p.sender, p.conversation_id, unread
                    ))
                }
            }
            ServerEvent::MessageReadAck(p) => {
                if store.active() != Some(p.conversation_id.as_str()) {
                    return None;
                }
                Some(format!(
                    "\n@{} read {} message(s)\n",
                    p.read_by,
                    p.message_ids.len()
                ))
            }
            ServerEvent::ChatMessageUpdate(_) => None,
            ServerEvent::FriendRequestReceived(_) => {
                Some("\n* new friend request (type /requests)\n".to_string())
            }
            ServerEvent::FriendRequestResponded(p) => {
                let verb = if p.accepted { "accepted" } else { "declined" };
                Some(format!("\n* your friend request was {}\n", verb))
            }
            ServerEvent::FriendRequestSeen(_) | ServerEvent::FriendNotificationsCleared(_) => None,
        }
    }

    /// Format the friend requests and notification counters
    pub fn format_friend_summary(
        requests: &FriendRequestsDto,
        notifications: &NotificationsDto,
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{}\nFriend requests:\n", RULE));

        let incoming = requests.incoming.as_deref().unwrap_or_default();
        let outgoing = requests.outgoing.as_deref().unwrap_or_default();
        if incoming.is_empty() && outgoing.is_empty() {
            output.push_str("(No pending requests)\n");
        }
        for request in incoming {
            let mark = if request.is_read == Some(false) {
                " (new)"
            } else {
                ""
            };
            output.push_str(&format!(
                "<- {} from @{}{}\n",
                request.id, request.user.username, mark
            ));
        }
        for request in outgoing {
            output.push_str(&format!("-> {} to @{}\n", request.id, request.user.username));
        }

        let counts = &notifications.unread_counts;
        output.push_str(&format!(
            "Unread: {} request(s), {} acceptance(s)\n",
            counts.requests, counts.acceptances
        ));
        output.push_str(RULE);
        output.push('\n');
        output
    }

    pub fn format_sent_confirmation(message: &MessageDto) -> String {
        format!("sent at {}\n", message.time)
    }

    pub fn format_help() -> String {
        "\nCommands: /open <id>, /close, /list, /history, /requests, /quit\n\
         Any other line is sent to the open conversation.\n"
            .to_string()
    }

    pub fn format_notice(text: &str) -> String {
        format!("\n! {}\n", text)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tayori_server::infrastructure::dto::{
        http::{ChatSummaryDto, FriendRequestDto, UnreadCountsDto},
        websocket::{MessagePayload, ReadAckPayload},
    };

    fn user(id: &str) -> UserDto {
        UserDto {
            id: id.to_string(),
            username: id.to_string(),
            name: id.to_uppercase(),
            status: "online".to_string(),
        }
    }

    fn message(id: &str, sender: &str, read: bool) -> MessageDto {
        MessageDto {
            id: id.to_string(),
            text: "Hello, world!".to_string(),
            conversation_id: "c1".to_string(),
            sender: sender.to_string(),
            time: "09:05".to_string(),
            created_at: "2023-01-01T09:05:00.000Z".to_string(),
            read,
        }
    }

    fn store() -> ChatStore {
        let mut store = ChatStore::new("alice");
        store.replace_chats(vec![ChatSummaryDto {
            id: "c1".to_string(),
            participant: user("bob"),
            last_message: Some("Hello, world!".to_string()),
            unread: 2,
            updated_at: "2023-01-01T09:05:00.000Z".to_string(),
        }]);
        store
    }

    #[test]
    fn test_format_chat_list_with_no_chats() {
        // テスト項目: 会話が無い場合、適切なメッセージが表示される
        // given (前提条件):
        let store = ChatStore::new("alice");

        // when (操作):
        let result = MessageFormatter::format_chat_list(&store);

        // then (期待する結果):
        assert!(result.contains("Chats:"));
        assert!(result.contains("(No chats)"));
        assert!(result.contains(RULE));
    }

    #[test]
    fn test_format_chat_list_shows_presence_and_unread() {
        // テスト項目: 会話一覧に相手の presence と未読数が表示される
        // given (前提条件):
        let store = store();

        // when (操作):
        let result = MessageFormatter::format_chat_list(&store);

        // then (期待する結果):
        assert!(result.contains("c1  BOB (online) [2 unread]"));
        assert!(result.contains("Hello, world!"));
    }

    #[test]
    fn test_format_message_marks_own_receipts() {
        // テスト項目: 自分のメッセージには既読マークが付き、相手のメッセージには送信者が付く
        // when (操作):
        let own_read = MessageFormatter::format_message(&message("m1", "alice", true), "alice");
        let own_sent = MessageFormatter::format_message(&message("m2", "alice", false), "alice");
        let theirs = MessageFormatter::format_message(&message("m3", "bob", false), "alice");

        // then (期待する結果):
        assert_eq!(own_read, "[09:05] me: Hello, world! (read)");
        assert_eq!(own_sent, "[09:05] me: Hello, world! (sent)");
        assert_eq!(theirs, "[09:05] @bob: Hello, world!");
    }

    #[test]
    fn test_format_history_lists_messages() {
        // テスト項目: 履歴に会話相手の名前とメッセージが表示される
        // given (前提条件):
        let mut store = store();
        store.replace_messages("c1", vec![message("m1", "bob", true)]);

        // when (操作):
        let result = MessageFormatter::format_history(&store, "c1");

        // then (期待する結果):
        assert!(result.contains("Conversation with BOB"));
        assert!(result.contains("@bob: Hello, world!"));
    }

    #[test]
    fn test_format_event_for_background_message() {
        // テスト項目: 開いていない会話へのメッセージは未読数付きの通知として表示される
        // given (前提条件):
        let store = store();
        let event = ServerEvent::MessageReceive(MessagePayload {
            id: "m9".to_string(),
            text: "ping".to_string(),
            conversation_id: "c1".to_string(),
            sender: "bob".to_string(),
            time: "09:10".to_string(),
            created_at: "2023-01-01T09:10:00.000Z".to_string(),
            read: false,
            is_in_active_chat: false,
        });

        // when (操作):
        let result = MessageFormatter::format_event(&event, &store);

        // then (期待する結果):
        let text = result.unwrap();
        assert!(text.contains("new message from @bob in c1 (2 unread)"));
    }

    #[test]
    fn test_format_event_hides_ack_for_other_chat() {
        // テスト項目: 開いていない会話の既読通知は表示されない
        // given (前提条件):
        let store = store();
        let event = ServerEvent::MessageReadAck(ReadAckPayload {
            conversation_id: "c1".to_string(),
            message_ids: vec!["m1".to_string()],
            read_by: "bob".to_string(),
        });

        // when (操作):
        let result = MessageFormatter::format_event(&event, &store);

        // then (期待する結果):
        assert!(result.is_none());
    }

    #[test]
    fn test_format_friend_summary() {
        // テスト項目: フレンドリクエストの一覧と未読数が表示される
        // given (前提条件):
        let requests = FriendRequestsDto {
            incoming: Some(vec![FriendRequestDto {
                id: "r1".to_string(),
                user: user("carol"),
                created_at: "2023-01-01T09:00:00.000Z".to_string(),
                is_read: Some(false),
            }]),
            outgoing: Some(Vec::new()),
        };
        let notifications = NotificationsDto {
            requests: None,
            acceptances: None,
            unread_counts: UnreadCountsDto {
                total: 1,
                requests: 1,
                acceptances: 0,
            },
        };

        // when (操作):
        let result = MessageFormatter::format_friend_summary(&requests, &notifications);

        // then (期待する結果):
        assert!(result.contains("<- r1 from @carol (new)"));
        assert!(result.contains("Unread: 1 request(s), 0 acceptance(s)"));
    }

    #[test]
    fn test_format_raw_message() {
        // テスト項目: 生メッセージが正しくフォーマットされる
        // given (前提条件):
        let text = "unknown message format";

        // when (操作):
        let result = MessageFormatter::format_raw_message(text);

        // then (期待する結果):
        assert!(result.contains("unknown message format"));
        assert!(result.contains("Received:"));
    }
}
