//! InMemory Repository 実装
//!
//! ドメイン層が定義する Repository trait の具体的な実装。
//! プロセス再起動でデータは失われる。各呼び出しはロック 1 回で完結するため、
//! 呼び出し単位の原子性はストア側が保証する。

mod conversation;
mod friend_request;
mod message;
mod user;

pub use conversation::InMemoryConversationRepository;
pub use friend_request::InMemoryFriendRequestRepository;
pub use message::InMemoryMessageRepository;
pub use user::InMemoryUserRepository;
