//! Value objects
//!
//! 識別子やメッセージ本文など、生成時に検証される不変の値。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// 識別子の最大長（バイト）
pub const MAX_ID_LENGTH: usize = 64;

/// メッセージ本文の最大長（文字数）
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Username の最大長（文字数）
pub const MAX_USERNAME_LENGTH: usize = 32;

fn validate_id(kind: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.is_empty() {
        return Err(ValueObjectError::EmptyIdentifier(kind));
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(ValueObjectError::IdentifierTooLong(kind, MAX_ID_LENGTH));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValueObjectError::InvalidIdentifier(kind, value.to_string()));
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// 検証済みの識別子を作成
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_id($kind, &value)?;
                Ok(Self(value))
            }

            /// UUID v4 から新しい識別子を生成
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// 認証済みユーザーの ID
    UserId,
    "user id"
);
identifier!(
    /// 会話（2 人の参加者で構成）の ID
    ConversationId,
    "conversation id"
);
identifier!(
    /// 永続化されたメッセージの ID
    MessageId,
    "message id"
);
identifier!(
    /// フレンドリクエストの ID
    FriendRequestId,
    "friend request id"
);
identifier!(
    /// WebSocket 接続ごとに払い出される ID
    ///
    /// 同じユーザーが再接続した際、古い接続の後始末が新しい接続を
    /// 消してしまわないよう区別するために使う。
    ConnectionId,
    "connection id"
);

/// メッセージ本文（前後の空白を除去済み、空でない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyMessage);
        }
        if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ValueObjectError::MessageTooLong(MAX_MESSAGE_LENGTH));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// ユーザー名（英数字とアンダースコア、大文字小文字を区別しない）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() || normalized.chars().count() > MAX_USERNAME_LENGTH {
            return Err(ValueObjectError::InvalidUsername(value));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(ValueObjectError::InvalidUsername(value));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_uuid_and_slug() {
        // テスト項目: UUID やスラッグ形式の ID は受け入れられる
        // given (前提条件):
        let uuid = Uuid::new_v4().to_string();

        // when (操作):
        let from_uuid = ConversationId::new(uuid.clone());
        let from_slug = UserId::try_from("alice_01");

        // then (期待する結果):
        assert_eq!(from_uuid.unwrap().as_str(), uuid);
        assert_eq!(from_slug.unwrap().as_str(), "alice_01");
    }

    #[test]
    fn test_identifier_rejects_empty_and_invalid() {
        // テスト項目: 空文字や記号を含む ID は拒否される
        // when (操作):
        let empty = UserId::new(String::new());
        let spaced = UserId::try_from("alice bob");
        let too_long = MessageId::new("a".repeat(MAX_ID_LENGTH + 1));

        // then (期待する結果):
        assert_eq!(empty, Err(ValueObjectError::EmptyIdentifier("user id")));
        assert!(matches!(
            spaced,
            Err(ValueObjectError::InvalidIdentifier("user id", _))
        ));
        assert_eq!(
            too_long,
            Err(ValueObjectError::IdentifierTooLong(
                "message id",
                MAX_ID_LENGTH
            ))
        );
    }

    #[test]
    fn test_identifier_deserialization_is_validated() {
        // テスト項目: JSON からの復元時にも ID が検証される
        // when (操作):
        let ok: Result<ConversationId, _> = serde_json::from_str("\"c1\"");
        let bad: Result<ConversationId, _> = serde_json::from_str("\"c 1\"");

        // then (期待する結果):
        assert_eq!(ok.unwrap().as_str(), "c1");
        assert!(bad.is_err());
    }

    #[test]
    fn test_message_text_is_trimmed() {
        // テスト項目: メッセージ本文は前後の空白が除去される
        // when (操作):
        let text = MessageText::new("  hello  ".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn test_message_text_rejects_blank_and_oversized() {
        // テスト項目: 空白のみ・長すぎるメッセージは拒否される
        // when (操作):
        let blank = MessageText::new("   ".to_string());
        let oversized = MessageText::new("x".repeat(MAX_MESSAGE_LENGTH + 1));
        let at_limit = MessageText::new("x".repeat(MAX_MESSAGE_LENGTH));

        // then (期待する結果):
        assert_eq!(blank, Err(ValueObjectError::EmptyMessage));
        assert_eq!(
            oversized,
            Err(ValueObjectError::MessageTooLong(MAX_MESSAGE_LENGTH))
        );
        assert!(at_limit.is_ok());
    }

    #[test]
    fn test_username_is_normalized_to_lowercase() {
        // テスト項目: ユーザー名は小文字に正規化される
        // when (操作):
        let username = Username::new(" Alice ".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(username.as_str(), "alice");
        assert!(Username::new("al ice".to_string()).is_err());
    }
}
