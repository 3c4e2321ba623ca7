//! Authenticated user extractor.
//!
//! トークンは `Authorization: Bearer <token>` ヘッダー、または
//! `?token=<token>` クエリから取得する（ブラウザの WebSocket はヘッダーを付けられない）。

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;

use crate::{
    domain::{AuthError, UserId},
    ui::state::AppState,
};

use super::error::ApiError;

/// 認証済みのユーザー
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).or_else(|| {
            Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(query)| query.token)
        });
        let Some(token) = token else {
            tracing::debug!("Rejecting {}: no token", parts.uri.path());
            return Err(AuthError::MissingToken.into());
        };

        match state.authenticator.authenticate(&token).await {
            Ok(user_id) => Ok(Self(user_id)),
            Err(e) => {
                tracing::debug!("Rejecting {}: {}", parts.uri.path(), e);
                Err(e.into())
            }
        }
    }
}
