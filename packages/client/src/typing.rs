//! typing 通知のデバウンス
//!
//! キー入力があれば `true` を一度だけ送り、2 秒間入力が無いか、
//! メッセージを送信したら `false` を送る。返り値が `Some` のときだけ送信する。

use std::time::{Duration, Instant};

/// 入力停止とみなすまでの無入力時間
pub const TYPING_IDLE_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct TypingDebouncer {
    window: Duration,
    last_input: Option<Instant>,
    typing: bool,
}

impl Default for TypingDebouncer {
    fn default() -> Self {
        Self::new(TYPING_IDLE_WINDOW)
    }
}

impl TypingDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_input: None,
            typing: false,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// キー入力があった
    pub fn on_input(&mut self, now: Instant) -> Option<bool> {
        self.last_input = Some(now);
        if self.typing {
            return None;
        }
        self.typing = true;
        Some(true)
    }

    /// 定期的に呼ぶ。無入力時間を過ぎたら一度だけ `false` を返す
    pub fn poll(&mut self, now: Instant) -> Option<bool> {
        match self.last_input {
            Some(last) if self.typing && now.saturating_duration_since(last) >= self.window => {
                self.stop()
            }
            _ => None,
        }
    }

    /// メッセージ送信・会話の切り替え
    pub fn stop(&mut self) -> Option<bool> {
        self.last_input = None;
        if !self.typing {
            return None;
        }
        self.typing = false;
        Some(false)
    }
}
