//! HTTP / WebSocket handlers.

mod auth;
mod error;
mod http;
mod websocket;

pub use http::{
    get_chat_list, get_friend_notifications, get_friend_requests, get_friends, get_me,
    get_messages, get_user, health_check, mark_friend_notifications_read, respond_friend_request,
    send_friend_request, send_message,
};
pub use websocket::websocket_handler;
