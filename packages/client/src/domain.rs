//! Client-side decisions that need no I/O.
//!
//! 再接続の判定と入力行の解釈。どちらも純粋関数なのでテストは同期で書ける。

use crate::error::ClientError;

/// Errors after which retrying cannot help: the token was rejected.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Unauthorized | ClientError::Api { status: 401, .. }
    )
}

/// Whether the runner should open a new session after `error`.
///
/// `attempts_made` counts failed sessions so far; retries stop once it
/// reaches `max_attempts`.
pub fn should_attempt_reconnect(
    error: &ClientError,
    attempts_made: u32,
    max_attempts: u32,
) -> bool {
    !should_exit_immediately(error) && attempts_made < max_attempts
}

/// 入力行の解釈結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 会話を開く
    Open(String),
    /// 開いている会話を閉じる
    Close,
    /// 会話一覧
    List,
    /// 開いている会話の履歴を取り直す
    History,
    /// フレンドリクエスト一覧
    Requests,
    Quit,
    /// 開いている会話にメッセージを送る
    Send(String),
    /// 解釈できないコマンド
    Unknown(String),
}

/// Parse one line of user input.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();
    match (name, arg) {
        ("open", id) if !id.is_empty() => Command::Open(id.to_string()),
        ("close", "") => Command::Close,
        ("list", "") => Command::List,
        ("history", "") => Command::History,
        ("requests", "") => Command::Requests,
        ("quit" | "exit", "") => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}
