//! REST client for the relay's HTTP API.

use reqwest::{Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use tayori_server::infrastructure::dto::http::{
    ChatSummaryDto, ErrorDto, FriendRequestsDto, MarkNotificationsReadBody,
    MarkNotificationsReadDto, MessageDto, NotificationsDto, SendMessageBody, UserDto,
};

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8080/api`
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub async fn me(&self) -> Result<UserDto, ClientError> {
        self.get("/users/me").await
    }

    pub async fn chat_list(&self) -> Result<Vec<ChatSummaryDto>, ClientError> {
        self.get("/conversations").await
    }

    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<MessageDto>, ClientError> {
        self.get(&format!("/conversations/{}/messages", conversation_id))
            .await
    }

    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<MessageDto, ClientError> {
        let body = SendMessageBody {
            text: text.to_string(),
        };
        self.post(&format!("/conversations/{}/messages", conversation_id), &body)
            .await
    }

    pub async fn friend_requests(&self) -> Result<FriendRequestsDto, ClientError> {
        self.get("/friends/requests?direction=all").await
    }

    pub async fn notifications(&self) -> Result<NotificationsDto, ClientError> {
        self.get("/friends/notifications?type=all").await
    }

    /// Mark every friend notification of `kind` read (`requests`, `acceptances` or `all`).
    pub async fn mark_notifications_read(
        &self,
        kind: &str,
    ) -> Result<MarkNotificationsReadDto, ClientError> {
        let body = MarkNotificationsReadBody {
            kind: kind.to_string(),
            ids: None,
        };
        self.post("/friends/notifications/read", &body).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }

    let message = match response.json::<ErrorDto>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
