//! Authenticator trait 定義
//!
//! ソケット・REST のハンドシェイクで受け取った bearer token を
//! ユーザー ID に解決する。

use async_trait::async_trait;

use super::{AuthError, UserId};

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<UserId, AuthError>;
}
