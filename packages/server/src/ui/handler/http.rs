//! HTTP API endpoint handlers.
//!
//! REST は永続化と再取得の窓口。WebSocket のプッシュはヒントであり、
//! クライアントはここで取得した状態を正とする。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tayori_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::{
        ConversationId, FriendRequest, FriendRequestId, MessageText, NotificationKind, UserId,
    },
    infrastructure::dto::http::{
        ChatSummaryDto, FriendDto, FriendRequestDto, FriendRequestsDto, FriendRequestsQuery,
        FriendshipDto, FriendshipResponseDto, MarkNotificationsReadBody, MarkNotificationsReadDto,
        MessageDto, NotificationDto, NotificationsDto, NotificationsQuery,
        RespondFriendRequestBody, SendFriendRequestBody, SendMessageBody, UnreadCountsDto,
        UserDto,
    },
    ui::state::AppState,
    usecase::{ChatSummary, FriendEntry, FriendRequestError, RequestDirection, SendOutcome},
};

use super::{auth::AuthUser, error::ApiError};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

// ========================================
// Users / Conversations
// ========================================

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let user_id = UserId::try_from(user_id).map_err(|_| ApiError::not_found("user not found"))?;
    let user = state.get_user_usecase.execute(&user_id).await?;
    Ok(Json(UserDto::from(&user)))
}

/// 認証済みユーザー自身
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.get_user_usecase.execute(&user_id).await?;
    Ok(Json(UserDto::from(&user)))
}

fn chat_summary_dto(summary: &ChatSummary) -> ChatSummaryDto {
    ChatSummaryDto {
        id: summary.conversation.id.to_string(),
        participant: UserDto::from(&summary.participant),
        last_message: summary
            .last_message
            .as_ref()
            .map(|message| message.text.as_str().to_string()),
        unread: summary.unread,
        updated_at: timestamp_to_rfc3339(summary.conversation.updated_at.value()),
    }
}

pub async fn get_chat_list(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ChatSummaryDto>>, ApiError> {
    let chats = state.get_chat_list_usecase.execute(&user_id).await?;
    Ok(Json(chats.iter().map(chat_summary_dto).collect()))
}

fn conversation_id(raw: String) -> Result<ConversationId, ApiError> {
    ConversationId::try_from(raw).map_err(|_| ApiError::not_found("conversation not found"))
}

pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(conversation_id_raw): Path<String>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let conversation_id = conversation_id(conversation_id_raw)?;
    let messages = state
        .get_messages_usecase
        .execute(&user_id, &conversation_id)
        .await?;
    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

/// メッセージを永続化し、リレーで配信する
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(conversation_id_raw): Path<String>,
    Json(body): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let conversation_id = conversation_id(conversation_id_raw)?;
    let text = MessageText::new(body.text)?;
    let message = state
        .send_message_usecase
        .execute(user_id, conversation_id, text)
        .await?;
    Ok((StatusCode::CREATED, Json(MessageDto::from(&message))))
}

// ========================================
// Friends
// ========================================

fn request_id(raw: String) -> Result<FriendRequestId, ApiError> {
    FriendRequestId::try_from(raw).map_err(|_| FriendRequestError::RequestNotFound.into())
}

fn friendship_response(
    status: StatusCode,
    request: &FriendRequest,
    message: &str,
) -> (StatusCode, Json<FriendshipResponseDto>) {
    (
        status,
        Json(FriendshipResponseDto {
            friendship: FriendshipDto::from(request),
            message: message.to_string(),
        }),
    )
}

pub async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SendFriendRequestBody>,
) -> Result<(StatusCode, Json<FriendshipResponseDto>), ApiError> {
    if body.username_or_email.trim().is_empty() {
        return Err(ApiError::bad_request("username or email is required"));
    }
    let (request, outcome) = state
        .send_friend_request_usecase
        .execute(user_id, &body.username_or_email)
        .await?;
    let status = match outcome {
        SendOutcome::Created => StatusCode::CREATED,
        SendOutcome::Reopened | SendOutcome::AutoAccepted => StatusCode::OK,
    };
    Ok(friendship_response(status, &request, outcome.message()))
}

pub async fn respond_friend_request(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(request_id_raw): Path<String>,
    Json(body): Json<RespondFriendRequestBody>,
) -> Result<(StatusCode, Json<FriendshipResponseDto>), ApiError> {
    let request_id = request_id(request_id_raw)?;
    let request = state
        .respond_friend_request_usecase
        .execute(user_id, request_id, body.accept)
        .await?;
    let message = if body.accept {
        "Friend request accepted"
    } else {
        "Friend request rejected"
    };
    Ok(friendship_response(StatusCode::OK, &request, message))
}

fn friend_request_dto(entry: &FriendEntry, with_read_flag: bool) -> FriendRequestDto {
    FriendRequestDto {
        id: entry.request.id.to_string(),
        user: UserDto::from(&entry.user),
        created_at: timestamp_to_rfc3339(entry.request.created_at.value()),
        is_read: with_read_flag.then_some(entry.request.request_read),
    }
}

pub async fn get_friend_requests(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<FriendRequestsQuery>,
) -> Result<Json<FriendRequestsDto>, ApiError> {
    let direction = match query.direction.as_deref() {
        None => RequestDirection::All,
        Some(raw) => RequestDirection::parse(raw)
            .ok_or_else(|| FriendRequestError::InvalidDirection(raw.to_string()))?,
    };
    let list = state
        .friend_query_usecase
        .requests(&user_id, direction)
        .await?;
    Ok(Json(FriendRequestsDto {
        incoming: list
            .incoming
            .map(|entries| entries.iter().map(|e| friend_request_dto(e, true)).collect()),
        outgoing: list
            .outgoing
            .map(|entries| entries.iter().map(|e| friend_request_dto(e, false)).collect()),
    }))
}

pub async fn get_friends(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FriendDto>>, ApiError> {
    let friends = state.friend_query_usecase.friends(&user_id).await?;
    Ok(Json(
        friends
            .iter()
            .map(|entry| {
                let user = UserDto::from(&entry.user);
                FriendDto {
                    id: entry.request.id.to_string(),
                    user_id: user.id,
                    name: user.name,
                    username: user.username,
                    status: user.status,
                    friendship_date: timestamp_to_rfc3339(entry.request.updated_at.value()),
                }
            })
            .collect(),
    ))
}

fn notification_kind(raw: &str) -> Result<NotificationKind, ApiError> {
    NotificationKind::parse(raw)
        .ok_or_else(|| FriendRequestError::InvalidNotificationType(raw.to_string()).into())
}

pub async fn get_friend_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<NotificationsDto>, ApiError> {
    let kind = match query.kind.as_deref() {
        None => NotificationKind::All,
        Some(raw) => notification_kind(raw)?,
    };
    let notifications = state
        .friend_query_usecase
        .notifications(&user_id, kind)
        .await?;

    let unread_counts = UnreadCountsDto {
        requests: notifications.unread_requests(),
        acceptances: notifications.unread_acceptances(),
        total: notifications.unread_requests() + notifications.unread_acceptances(),
    };
    let to_dto = |entry: &FriendEntry, kind: &str, at: i64| NotificationDto {
        id: entry.request.id.to_string(),
        kind: kind.to_string(),
        user: UserDto::from(&entry.user),
        at: timestamp_to_rfc3339(at),
    };
    Ok(Json(NotificationsDto {
        requests: notifications.requests.map(|entries| {
            entries
                .iter()
                .map(|e| to_dto(e, "request", e.request.created_at.value()))
                .collect()
        }),
        acceptances: notifications.acceptances.map(|entries| {
            entries
                .iter()
                .map(|e| to_dto(e, "acceptance", e.request.updated_at.value()))
                .collect()
        }),
        unread_counts,
    }))
}

pub async fn mark_friend_notifications_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<MarkNotificationsReadBody>,
) -> Result<Json<MarkNotificationsReadDto>, ApiError> {
    let kind = notification_kind(&body.kind)?;
    let ids = match body.ids {
        Some(ids) if !ids.is_empty() => Some(
            ids.into_iter()
                .map(FriendRequestId::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        _ => None,
    };
    let counts = state
        .mark_notifications_read_usecase
        .execute(user_id, kind, ids)
        .await?;
    Ok(Json(MarkNotificationsReadDto {
        requests: counts.requests,
        acceptances: counts.acceptances,
        total: counts.total(),
    }))
}
