//! 会話ごとの typing 状態
//!
//! 会話 → (ユーザー → 入力中か) の対応表。永続化せず、サーバー側で期限切れにもしない。
//! 入力停止のタイムアウトはクライアントが判定する。

use std::collections::HashMap;

use super::value_object::{ConversationId, UserId};

#[derive(Debug, Default, Clone)]
pub struct TypingState {
    conversations: HashMap<ConversationId, HashMap<UserId, bool>>,
}

impl TypingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// フラグを保存し、実際に切り替わったかどうかを返す
    ///
    /// エントリの無いユーザーは入力中でない扱いなので、最初の `false` は何も作らない。
    pub fn set(
        &mut self,
        conversation_id: &ConversationId,
        user_id: &UserId,
        is_typing: bool,
    ) -> bool {
        if self.is_typing(conversation_id, user_id) == is_typing {
            return false;
        }
        self.conversations
            .entry(conversation_id.clone())
            .or_default()
            .insert(user_id.clone(), is_typing);
        true
    }

    pub fn is_typing(&self, conversation_id: &ConversationId, user_id: &UserId) -> bool {
        self.conversations
            .get(conversation_id)
            .and_then(|users| users.get(user_id))
            .copied()
            .unwrap_or(false)
    }

    /// 会話内で入力中のユーザー（ソート済み）
    pub fn typing_users(&self, conversation_id: &ConversationId) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .conversations
            .get(conversation_id)
            .map(|users| {
                users
                    .iter()
                    .filter(|(_, typing)| **typing)
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default();
        users.sort();
        users
    }
}
