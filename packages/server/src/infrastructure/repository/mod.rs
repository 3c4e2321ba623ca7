//! Repository 実装
//!
//! - `inmemory`: プロセス内の HashMap をストアとして使う実装

pub mod inmemory;

pub use inmemory::{
    InMemoryConversationRepository, InMemoryFriendRequestRepository, InMemoryMessageRepository,
    InMemoryUserRepository,
};
