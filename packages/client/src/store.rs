//! Client-side chat state.
//!
//! `ChatStore` は副作用を持たない。ソケットイベントを `apply` すると状態を更新し、
//! セッションが実行すべき副作用（既読送信・REST の再取得）を `Effect` として返す。
//! REST で取得した一覧は常に正として扱い、ローカルの状態を置き換える。

use std::collections::{HashMap, HashSet};

use tayori_server::infrastructure::dto::{
    http::{ChatSummaryDto, MessageDto},
    websocket::{ChatUpdatePayload, MessagePayload, ServerEvent},
};

/// Side effect requested by the store after applying an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `message:read` をこの会話に送る
    MarkRead(String),
    /// 会話一覧を REST で取り直す
    RefreshChats,
    /// フレンド関連を REST で取り直す
    RefreshFriends,
}

/// Result of applying one server event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// 状態が変化したか（重複メッセージや同じ値の presence は `false`）
    pub changed: bool,
    pub effects: Vec<Effect>,
}

impl Applied {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(effects: Vec<Effect>) -> Self {
        Self {
            changed: true,
            effects,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    me: String,
    /// Most recently updated first
    chats: Vec<ChatSummaryDto>,
    messages: HashMap<String, Vec<MessageDto>>,
    active: Option<String>,
    /// conversation id -> users currently typing
    typing: HashMap<String, HashSet<String>>,
    online: HashMap<String, bool>,
    friends_stale: bool,
}

impl ChatStore {
    pub fn new(me: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            ..Self::default()
        }
    }

    pub fn me(&self) -> &str {
        &self.me
    }

    pub fn chats(&self) -> &[ChatSummaryDto] {
        &self.chats
    }

    pub fn chat(&self, conversation_id: &str) -> Option<&ChatSummaryDto> {
        self.chats.iter().find(|chat| chat.id == conversation_id)
    }

    pub fn messages(&self, conversation_id: &str) -> &[MessageDto] {
        self.messages
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn typing_users(&self, conversation_id: &str) -> Vec<&str> {
        let mut users: Vec<&str> = self
            .typing
            .get(conversation_id)
            .map(|users| users.iter().map(String::as_str).collect())
            .unwrap_or_default();
        users.sort_unstable();
        users
    }

    /// Presence as last seen. Falls back to the status from the chat list.
    pub fn is_online(&self, user_id: &str) -> bool {
        if let Some(online) = self.online.get(user_id) {
            return *online;
        }
        self.chats
            .iter()
            .any(|chat| chat.participant.id == user_id && chat.participant.status == "online")
    }

    pub fn friends_stale(&self) -> bool {
        self.friends_stale
    }

    pub fn mark_friends_fresh(&mut self) {
        self.friends_stale = false;
    }

    /// Replace the chat list with a REST snapshot.
    pub fn replace_chats(&mut self, mut chats: Vec<ChatSummaryDto>) {
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        for chat in &chats {
            self.online
                .insert(chat.participant.id.clone(), chat.participant.status == "online");
        }
        self.chats = chats;
        if let Some(active) = self.active.clone() {
            self.reset_unread(&active);
        }
    }

    /// Replace the history of one conversation with a REST snapshot.
    pub fn replace_messages(&mut self, conversation_id: &str, messages: Vec<MessageDto>) {
        self.messages.insert(conversation_id.to_string(), messages);
    }

    /// Open a conversation. Its unread counter is reset locally.
    pub fn open(&mut self, conversation_id: &str) {
        self.active = Some(conversation_id.to_string());
        self.reset_unread(conversation_id);
    }

    /// Close the open conversation and return its id.
    pub fn close(&mut self) -> Option<String> {
        self.active.take()
    }

    /// Store a message this client sent (the REST response).
    pub fn add_own_message(&mut self, message: MessageDto) -> bool {
        self.insert_message(message)
    }

    pub fn apply(&mut self, event: &ServerEvent) -> Applied {
        match event {
            ServerEvent::UserOnline(payload) => self.set_online(&payload.user_id, true),
            ServerEvent::UserOffline(payload) => self.set_online(&payload.user_id, false),
            ServerEvent::Typing(payload) => {
                if payload.user_id == self.me {
                    return Applied::unchanged();
                }
                let users = self
                    .typing
                    .entry(payload.conversation_id.clone())
                    .or_default();
                let changed = if payload.is_typing {
                    users.insert(payload.user_id.clone())
                } else {
                    users.remove(&payload.user_id)
                };
                if changed {
                    Applied::changed(Vec::new())
                } else {
                    Applied::unchanged()
                }
            }
            ServerEvent::MessageReceive(payload) => self.receive(payload),
            ServerEvent::MessageReadAck(payload) => {
                let ids: HashSet<&str> = payload.message_ids.iter().map(String::as_str).collect();
                let mut flipped = false;
                if let Some(messages) = self.messages.get_mut(&payload.conversation_id) {
                    for message in messages
                        .iter_mut()
                        .filter(|m| !m.read && ids.contains(m.id.as_str()))
                    {
                        message.read = true;
                        flipped = true;
                    }
                }
                if flipped {
                    Applied::changed(Vec::new())
                } else {
                    Applied::unchanged()
                }
            }
            ServerEvent::ChatMessageUpdate(payload) => self.update_chat(payload),
            ServerEvent::FriendRequestReceived(_)
            | ServerEvent::FriendRequestSeen(_)
            | ServerEvent::FriendNotificationsCleared(_) => {
                self.friends_stale = true;
                Applied::changed(vec![Effect::RefreshFriends])
            }
            ServerEvent::FriendRequestResponded(hint) => {
                self.friends_stale = true;
                let mut effects = vec![Effect::RefreshFriends];
                // 承認で会話が作られている
                if hint.accepted {
                    effects.push(Effect::RefreshChats);
                }
                Applied::changed(effects)
            }
        }
    }

    fn set_online(&mut self, user_id: &str, online: bool) -> Applied {
        let previous = self.online.insert(user_id.to_string(), online);
        if previous == Some(online) {
            Applied::unchanged()
        } else {
            Applied::changed(Vec::new())
        }
    }

    fn receive(&mut self, payload: &MessagePayload) -> Applied {
        let inserted = self.insert_message(MessageDto {
            id: payload.id.clone(),
            text: payload.text.clone(),
            conversation_id: payload.conversation_id.clone(),
            sender: payload.sender.clone(),
            time: payload.time.clone(),
            created_at: payload.created_at.clone(),
            read: payload.read,
        });
        if !inserted {
            tracing::debug!("Ignoring duplicate message {}", payload.id);
            return Applied::unchanged();
        }

        if let Some(users) = self.typing.get_mut(&payload.conversation_id) {
            users.remove(&payload.sender);
        }

        let viewing = payload.is_in_active_chat
            || self.active.as_deref() == Some(payload.conversation_id.as_str());
        let mut effects = Vec::new();
        match self
            .chats
            .iter_mut()
            .find(|chat| chat.id == payload.conversation_id)
        {
            Some(chat) if viewing => chat.unread = 0,
            Some(chat) => chat.unread += 1,
            None => effects.push(Effect::RefreshChats),
        }
        if viewing {
            effects.push(Effect::MarkRead(payload.conversation_id.clone()));
        }
        Applied::changed(effects)
    }

    fn update_chat(&mut self, payload: &ChatUpdatePayload) -> Applied {
        let Some(position) = self.chats.iter().position(|chat| chat.id == payload.id) else {
            return Applied::changed(vec![Effect::RefreshChats]);
        };
        let mut chat = self.chats.remove(position);
        chat.last_message = Some(payload.last_message.clone());
        chat.updated_at = payload.updated_at.clone();
        self.chats.insert(0, chat);
        Applied::changed(Vec::new())
    }

    fn insert_message(&mut self, message: MessageDto) -> bool {
        let messages = self
            .messages
            .entry(message.conversation_id.clone())
            .or_default();
        if messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        messages.push(message);
        true
    }

    fn reset_unread(&mut self, conversation_id: &str) {
        if let Some(chat) = self.chats.iter_mut().find(|chat| chat.id == conversation_id) {
            chat.unread = 0;
        }
    }
}
