//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub name: String,
    pub status: String,
}

// ========================================
// Conversations
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageBody {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub text: String,
    pub conversation_id: String,
    pub sender: String,
    pub time: String,
    pub created_at: String,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummaryDto {
    pub id: String,
    pub participant: UserDto,
    pub last_message: Option<String>,
    pub unread: u32,
    pub updated_at: String,
}

// ========================================
// Friends
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestBody {
    pub username_or_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondFriendRequestBody {
    pub accept: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipDto {
    pub id: String,
    pub requester: String,
    pub recipient: String,
    pub status: String,
    pub request_read: bool,
    pub acceptance_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipResponseDto {
    pub friendship: FriendshipDto,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FriendRequestsQuery {
    pub direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestDto {
    pub id: String,
    pub user: UserDto,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FriendRequestsDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<Vec<FriendRequestDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<Vec<FriendRequestDto>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendDto {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub username: String,
    pub status: String,
    pub friendship_date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub user: UserDto,
    pub at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnreadCountsDto {
    pub total: usize,
    pub requests: usize,
    pub acceptances: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<Vec<NotificationDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptances: Option<Vec<NotificationDto>>,
    pub unread_counts: UnreadCountsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkNotificationsReadBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkNotificationsReadDto {
    pub requests: u64,
    pub acceptances: u64,
    pub total: u64,
}
