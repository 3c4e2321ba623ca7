//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{AuthError, RepositoryError, ValueObjectError},
    infrastructure::dto::http::ErrorDto,
    usecase::{FriendRequestError, QueryError, SendMessageError},
};

/// ステータスコードとメッセージの組（`{"error": "..."}` として返す）
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn repository(error: RepositoryError) -> Self {
        tracing::error!("Store error: {}", error);
        match error {
            RepositoryError::Unavailable(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorDto {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error.to_string())
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(error: ValueObjectError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<SendMessageError> for ApiError {
    fn from(error: SendMessageError) -> Self {
        match error {
            SendMessageError::ConversationNotFound => Self::not_found(error.to_string()),
            SendMessageError::NotParticipant => {
                Self::new(StatusCode::FORBIDDEN, error.to_string())
            }
            SendMessageError::Repository(e) => Self::repository(e),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::NotFound(_) => Self::not_found(error.to_string()),
            QueryError::Repository(e) => Self::repository(e),
        }
    }
}

impl From<FriendRequestError> for ApiError {
    fn from(error: FriendRequestError) -> Self {
        match error {
            FriendRequestError::UserNotFound | FriendRequestError::RequestNotFound => {
                Self::not_found(error.to_string())
            }
            FriendRequestError::SelfRequest
            | FriendRequestError::AlreadyPending
            | FriendRequestError::AlreadyFriends
            | FriendRequestError::InvalidDirection(_)
            | FriendRequestError::InvalidNotificationType(_) => {
                Self::bad_request(error.to_string())
            }
            FriendRequestError::Repository(e) => Self::repository(e),
        }
    }
}
