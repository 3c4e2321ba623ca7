//! キー単位の非同期ロック
//!
//! 複数のリポジトリにまたがる更新（メッセージ挿入と未読数、接続表と presence）を
//! 同じキーについて直列化する。キーごとに `Mutex<()>` を 1 つ持つ。

use std::{collections::HashMap, hash::Hash, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::value_object::ConversationId;

#[derive(Debug)]
pub struct KeyedLock<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLock<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLock<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key` のロックを取得する。ガードを drop すると解放される。
    pub async fn acquire(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(key.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// 会話ごとの書き込みロック（送信と既読の直列化）
pub type ConversationLocks = KeyedLock<ConversationId>;
